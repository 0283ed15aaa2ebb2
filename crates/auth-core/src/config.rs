//! 설정 관리.
//!
//! 이 모듈은 인증 서비스 설정을 정의하고 로드합니다.
//!
//! 설정값은 기본값 → `config/default.toml`(선택) → `AUTH__섹션__키` 환경 변수 순으로
//! 덮어씁니다. 서명 시크릿과 저장소 연결 문자열은 [`Secrets`]로 따로 읽으며,
//! 누락되면 서버가 시작되지 않습니다.

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RevocationKeyMode;

/// 서명 시크릿 환경 변수.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
/// 저장소 연결 문자열 환경 변수.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Redis 연결 문자열 환경 변수 (Redis 폐기 저장소 사용 시).
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 풀 설정
    pub database: DatabaseConfig,
    /// 저장소 호출 설정
    pub store: StoreConfig,
    /// 세션 토큰 설정
    pub token: TokenConfig,
    /// 비밀번호 해싱 설정
    pub password: PasswordConfig,
    /// 토큰 폐기 설정
    pub revocation: RevocationConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 시작 시 마이그레이션 실행 여부
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout_secs: 10,
            run_migrations: true,
        }
    }
}

/// 저장소 호출 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 저장소 호출 1회당 데드라인 (밀리초)
    pub timeout_ms: u64,
}

impl StoreConfig {
    /// 데드라인을 `Duration`으로 반환.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: 3_000 }
    }
}

/// 세션 토큰 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// 토큰 수명 (시간)
    pub ttl_hours: i64,
    /// `iss` 클레임 (설정 시 검증에도 사용)
    pub issuer: Option<String>,
}

impl TokenConfig {
    /// 토큰 수명.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            issuer: None,
        }
    }
}

/// 비밀번호 해싱 설정 (Argon2id 작업 계수).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
    /// 가입 시 비밀번호 강도 정책 적용 여부
    pub enforce_strength: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
            enforce_strength: false,
        }
    }
}

/// 폐기 목록 저장소 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    /// `revoked_tokens` 테이블
    #[default]
    Postgres,
    /// TTL 키 (토큰 수명이 지나면 자동 삭제)
    Redis,
}

/// 토큰 폐기 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RevocationConfig {
    /// 저장소 종류
    pub backend: RevocationBackend,
    /// 저장 키 형식
    pub key_mode: RevocationKeyMode,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AuthConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (없으면 기본값 사용)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("AUTH")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

/// 시작 시 필요한 비밀 값 에러.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// 필수 환경 변수 누락
    #[error("필수 환경 변수가 설정되지 않았습니다: {0}")]
    Missing(&'static str),
    /// 빈 값
    #[error("환경 변수 값이 비어 있습니다: {0}")]
    Empty(&'static str),
}

/// 프로세스 시작 시 한 번 읽는 비밀 값.
///
/// `Debug` 출력과 로그에 값이 노출되지 않도록 `SecretString`으로 보관합니다.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// 토큰 서명 시크릿
    pub jwt_secret: SecretString,
    /// PostgreSQL 연결 문자열
    pub database_url: SecretString,
    /// Redis 연결 문자열
    pub redis_url: Option<SecretString>,
}

impl Secrets {
    /// 프로세스 환경 변수에서 로드.
    pub fn from_env() -> Result<Self, SecretsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수에서 로드.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<SecretString, SecretsError> {
            let value = lookup(key).ok_or(SecretsError::Missing(key))?;
            if value.trim().is_empty() {
                return Err(SecretsError::Empty(key));
            }
            Ok(SecretString::from(value))
        };

        let jwt_secret = required(JWT_SECRET_ENV)?;
        let database_url = required(DATABASE_URL_ENV)?;
        let redis_url = lookup(REDIS_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            jwt_secret,
            database_url,
            redis_url,
        })
    }

    /// 선택한 폐기 저장소에 필요한 값이 모두 있는지 확인.
    pub fn require_backend(&self, backend: RevocationBackend) -> Result<(), SecretsError> {
        match backend {
            RevocationBackend::Redis if self.redis_url.is_none() => {
                Err(SecretsError::Missing(REDIS_URL_ENV))
            }
            _ => Ok(()),
        }
    }

    /// 데이터베이스 URL 평문 (연결 시에만 사용).
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}
