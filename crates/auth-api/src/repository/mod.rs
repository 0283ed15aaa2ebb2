//! 저장소 구현.
//!
//! auth-core의 [`CredentialStore`](auth_core::CredentialStore)/
//! [`RevocationStore`](auth_core::RevocationStore)를 PostgreSQL과 Redis로 구현합니다.
//! 드라이버 에러는 이 모듈에서 [`StoreError`]로 변환되어 밖으로 새지 않습니다.

pub mod redis_revocation;
pub mod revoked_tokens;
pub mod users;

pub use redis_revocation::RedisRevocationStore;
pub use revoked_tokens::PgRevocationStore;
pub use users::PgCredentialStore;

use auth_core::StoreError;

/// PostgreSQL 고유 제약 조건 위반 코드
const UNIQUE_VIOLATION: &str = "23505";

/// sqlx 에러를 저장소 에러로 변환.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                StoreError::Duplicate(db_err.message().to_string())
            } else {
                StoreError::Unavailable(db_err.message().to_string())
            }
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Corrupt(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}
