//! 인증 서비스.
//!
//! 회원가입, 로그인, 로그아웃, 토큰 검증을 조합합니다. 서비스는 요청 간 상태를
//! 갖지 않으며, 두 저장소와 해셔/발급기/검증기는 생성 시 주입됩니다.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::domain::{PublicUser, Registration, RevocationKeyMode, RevokedToken, User};
use crate::error::{AuthError, AuthResult, StoreError};
use crate::logging::mask_email;
use crate::password::{validate_password_strength, PasswordError, PasswordHasher};
use crate::store::{with_deadline, CredentialStore, RevocationStore};
use crate::token::{token_fingerprint, SessionIdentity, TokenIssuer, TokenValidator};

/// 로그인 결과.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub token: String,
}

/// 인증 서비스.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    revocations: Arc<dyn RevocationStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
    clock: Arc<dyn Clock>,
    key_mode: RevocationKeyMode,
    store_timeout: Duration,
    enforce_strength: bool,
    /// 미가입 이메일 로그인 시 검증 비용을 맞추기 위한 해시
    dummy_hash: String,
}

impl AuthService {
    /// 시스템 시계로 서비스 생성.
    pub fn new(
        config: &AuthConfig,
        secret: &SecretString,
        credentials: Arc<dyn CredentialStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> AuthResult<Self> {
        Self::with_clock(config, secret, credentials, revocations, Arc::new(SystemClock))
    }

    /// 시계를 주입하여 서비스 생성.
    pub fn with_clock(
        config: &AuthConfig,
        secret: &SecretString,
        credentials: Arc<dyn CredentialStore>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        let hasher = PasswordHasher::new(&config.password).map_err(internal)?;
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string()).map_err(internal)?;
        let key_mode = config.revocation.key_mode;
        let store_timeout = config.store.timeout();

        let issuer = TokenIssuer::new(secret, &config.token, clock.clone())?;
        let validator = TokenValidator::new(
            secret,
            &config.token,
            clock.clone(),
            revocations.clone(),
            key_mode,
            store_timeout,
        )?;

        Ok(Self {
            credentials,
            revocations,
            hasher,
            issuer,
            validator,
            clock,
            key_mode,
            store_timeout,
            enforce_strength: config.password.enforce_strength,
            dummy_hash,
        })
    }

    /// 회원가입.
    ///
    /// # Errors
    ///
    /// - `Validation`: 이메일/비밀번호가 비어 있거나 강도 정책 위반
    /// - `DuplicateEmail`: 이미 등록된 이메일
    /// - `StoreUnavailable`: 저장소 타임아웃/연결 실패
    #[instrument(skip_all, fields(email = %mask_email(&registration.email)))]
    pub async fn register(&self, registration: Registration) -> AuthResult<PublicUser> {
        let Registration {
            email,
            password,
            name,
        } = registration;

        validate_email(&email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("비밀번호를 입력해주세요".to_string()));
        }
        if self.enforce_strength {
            validate_password_strength(&password)
                .map_err(|msg| AuthError::Validation(msg.to_string()))?;
        }

        let existing = with_deadline(
            self.store_timeout,
            "credentials.find_by_email",
            self.credentials.find_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            info!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_blocking(password).await?;
        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // 조회와 insert 사이의 경합은 저장소의 고유 제약으로 판정
        match with_deadline(
            self.store_timeout,
            "credentials.insert",
            self.credentials.insert(&user),
        )
        .await
        {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                info!("Registration rejected: email already registered");
                return Err(AuthError::DuplicateEmail);
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, "User registered");
        Ok(user.to_public())
    }

    /// 로그인.
    ///
    /// 미가입 이메일과 잘못된 비밀번호는 모두 `InvalidCredentials`로 반환되며,
    /// 미가입 이메일도 더미 해시로 검증을 수행해 응답 시간 차이를 줄입니다.
    #[instrument(skip_all, fields(email = %mask_email(email)))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "이메일과 비밀번호를 입력해주세요".to_string(),
            ));
        }

        let user = with_deadline(
            self.store_timeout,
            "credentials.find_by_email",
            self.credentials.find_by_email(email),
        )
        .await?;

        let Some(user) = user else {
            let _ = self
                .verify_blocking(self.dummy_hash.clone(), password.to_string())
                .await;
            info!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verify_blocking(user.password_hash.clone(), password.to_string())
            .await
            .map_err(|e| {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                e
            })?;
        if !matches {
            info!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user.email, &user.id.to_string())?;
        info!(user_id = %user.id, token = %token_fingerprint(&token), "Login succeeded");

        Ok(LoginOutcome {
            user: user.to_public(),
            token,
        })
    }

    /// 로그아웃 (토큰 폐기).
    ///
    /// 서명/만료를 검증하지 않고 폐기 목록에 추가합니다. 이미 폐기된 토큰이나
    /// 만료된 토큰을 다시 폐기해도 에러가 아닙니다.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: Option<&str>) -> AuthResult<()> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(AuthError::MissingToken);
        };

        let record = RevokedToken::new(self.key_mode, token, self.clock.now().timestamp());
        with_deadline(
            self.store_timeout,
            "revocations.revoke",
            self.revocations.revoke(&record),
        )
        .await?;

        info!(token = %token_fingerprint(token), "Token revoked");
        Ok(())
    }

    /// 토큰 검증 (서명 → 만료 → 폐기 목록).
    pub async fn validate(&self, token: &str) -> AuthResult<SessionIdentity> {
        self.validator.validate(token).await
    }

    /// 두 저장소의 연결 상태 확인.
    pub async fn check_stores(&self) -> Result<(), StoreError> {
        with_deadline(self.store_timeout, "credentials.ping", self.credentials.ping()).await?;
        with_deadline(self.store_timeout, "revocations.ping", self.revocations.ping()).await
    }

    async fn hash_blocking(&self, password: String) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("해싱 작업 실패: {}", e)))?
            .map_err(internal)
    }

    async fn verify_blocking(&self, hash: String, password: String) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("검증 작업 실패: {}", e)))?
            .map_err(internal)
    }
}

fn internal(err: PasswordError) -> AuthError {
    AuthError::Internal(err.to_string())
}

fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() {
        return Err(AuthError::Validation("이메일을 입력해주세요".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::Validation("잘못된 이메일 형식".to_string())),
    }
}
