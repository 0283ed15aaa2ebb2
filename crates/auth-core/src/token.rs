//! 세션 토큰 발급 및 검증.
//!
//! 세션은 상태를 서버에 두지 않는 HS256 JWT입니다. 유효성은 서명과 만료로 증명되며,
//! 만료 전에 무효화하려면 폐기 목록에 등록해야 합니다.
//!
//! 토큰이 유효하려면 다음을 모두 만족해야 합니다.
//! 1. 프로세스 시크릿으로 서명이 검증됨
//! 2. 현재 시각 < `exp`
//! 3. 폐기 목록에 없음
//!
//! 만료는 서명 검증이 끝난 클레임에 대해서만 [`Clock`]으로 판정합니다.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::clock::Clock;
use crate::config::TokenConfig;
use crate::domain::RevocationKeyMode;
use crate::error::{AuthError, AuthResult, TokenRejection};
use crate::store::{with_deadline, RevocationStore};

/// 세션 토큰 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 이메일
    pub email: String,
    /// 사용자 ID
    pub user_id: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// 검증을 통과한 토큰이 증명하는 신원.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct SessionIdentity {
    pub email: String,
    pub user_id: String,
}

impl From<Claims> for SessionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            user_id: claims.user_id,
        }
    }
}

/// 로그용 토큰 지문 (SHA-256 앞 12자리).
pub fn token_fingerprint(token: &str) -> String {
    let digest = hex::encode(Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}

fn signing_secret(secret: &SecretString) -> AuthResult<&[u8]> {
    let bytes = secret.expose_secret().as_bytes();
    if bytes.is_empty() {
        return Err(AuthError::Internal("서명 시크릿이 비어 있습니다".to_string()));
    }
    Ok(bytes)
}

/// 세션 토큰 발급기.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: chrono::Duration,
    issuer: Option<String>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(
        secret: &SecretString,
        config: &TokenConfig,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_secret(secret)?),
            ttl: config.ttl(),
            issuer: config.issuer.clone(),
            clock,
        })
    }

    /// 현재 시각 기준 클레임 생성.
    pub fn claims_for(&self, email: &str, user_id: &str) -> Claims {
        let now = self.clock.now();
        Claims {
            email: email.to_string(),
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        }
    }

    /// 토큰 발급. 발급 사실은 어디에도 저장되지 않습니다.
    pub fn issue(&self, email: &str, user_id: &str) -> AuthResult<String> {
        let claims = self.claims_for(email, user_id);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("토큰 서명 실패: {}", e)))
    }
}

/// 세션 토큰 검증기.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    revocations: Arc<dyn RevocationStore>,
    key_mode: RevocationKeyMode,
    store_timeout: Duration,
}

impl TokenValidator {
    pub fn new(
        secret: &SecretString,
        config: &TokenConfig,
        clock: Arc<dyn Clock>,
        revocations: Arc<dyn RevocationStore>,
        key_mode: RevocationKeyMode,
        store_timeout: Duration,
    ) -> AuthResult<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 서명 검증 후 주입된 Clock으로 판정
        validation.validate_exp = false;
        validation.leeway = 0;
        if let Some(issuer) = &config.issuer {
            // iss가 없는 토큰도 거부해야 하므로 필수 클레임으로 지정
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(signing_secret(secret)?),
            validation,
            clock,
            revocations,
            key_mode,
            store_timeout,
        })
    }

    /// 서명과 만료만 검증 (폐기 목록 조회 없음).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                _ => TokenRejection::Malformed,
            }
        })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenRejection::Expired);
        }

        Ok(data.claims)
    }

    /// 전체 검증: 서명 → 만료 → 폐기 목록.
    pub async fn validate(&self, token: &str) -> AuthResult<SessionIdentity> {
        let claims = self.verify(token).map_err(|rejection| {
            debug!(
                reason = rejection.as_str(),
                token = %token_fingerprint(token),
                "Token rejected"
            );
            AuthError::TokenInvalid(rejection)
        })?;

        let key = self.key_mode.derive(token);
        let revoked = with_deadline(
            self.store_timeout,
            "revocations.is_revoked",
            self.revocations.is_revoked(&key),
        )
        .await?;

        if revoked {
            debug!(
                reason = TokenRejection::Revoked.as_str(),
                user_id = %claims.user_id,
                token = %token_fingerprint(token),
                "Token rejected"
            );
            return Err(AuthError::TokenInvalid(TokenRejection::Revoked));
        }

        Ok(claims.into())
    }
}
