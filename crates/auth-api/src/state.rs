//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다. 요청 간 상태는
//! 두 저장소에만 있으므로 AppState 자체에는 락이 없습니다.

use std::sync::Arc;

use auth_core::AuthService;
use chrono::{DateTime, Utc};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 회원가입/로그인/로그아웃/토큰 검증
    pub auth: Arc<AuthService>,

    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 풀 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

/// 테스트용 상태 생성 (인메모리 저장소, 저비용 해싱).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with_clock(Arc::new(auth_core::SystemClock))
}

/// 시계를 주입한 테스트용 상태 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with_clock(clock: Arc<dyn auth_core::Clock>) -> AppState {
    use auth_core::{
        AuthConfig, InMemoryCredentialStore, InMemoryRevocationStore, PasswordConfig,
    };
    use secrecy::SecretString;

    let config = AuthConfig {
        password: PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
            enforce_strength: false,
        },
        ..AuthConfig::default()
    };
    let secret = SecretString::from("test-secret-key-for-jwt-testing-minimum-32-chars".to_string());

    let auth = AuthService::with_clock(
        &config,
        &secret,
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryRevocationStore::new()),
        clock,
    )
    .expect("Failed to create AuthService for test");

    AppState::new(Arc::new(auth))
}
