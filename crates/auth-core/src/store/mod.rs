//! 저장소 추상화.
//!
//! 자격증명 저장소와 폐기 목록 저장소는 외부 자원입니다. 이 크레이트는 저장소가
//! 단일 레코드 원자성(고유 키 insert는 성공 또는 실패)을 보장한다고 가정하며,
//! 클라이언트 측 락은 두지 않습니다.
//!
//! 모든 호출은 [`with_deadline`]으로 감싸 고정 데드라인 안에 끝나도록 합니다.

mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{RevokedToken, User};
use crate::error::StoreError;

pub use memory::{InMemoryCredentialStore, InMemoryRevocationStore};

/// 사용자 레코드 저장소.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 이메일(대소문자 구분)로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// 사용자 저장.
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate`: 같은 이메일이 이미 존재
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// 폐기된 토큰 저장소.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// 폐기 레코드 저장. 이미 존재하면 아무 일도 하지 않습니다.
    async fn revoke(&self, record: &RevokedToken) -> Result<(), StoreError>;

    /// 저장 키가 폐기 목록에 있는지 확인.
    async fn is_revoked(&self, key: &str) -> Result<bool, StoreError>;

    /// 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// 저장소 호출에 데드라인 적용.
///
/// 데드라인이 지나면 진행 중인 future는 drop되어 취소되고
/// `StoreError::Timeout`이 반환됩니다.
pub async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = deadline.as_millis() as u64, "Store call timed out");
            Err(StoreError::Timeout {
                operation,
                timeout: deadline,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_times_out() {
        let result: Result<(), StoreError> = with_deadline(
            Duration::from_millis(100),
            "test.slow",
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(StoreError::Timeout {
                operation: "test.slow",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let ok = with_deadline(Duration::from_secs(1), "test.ok", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<(), StoreError> = with_deadline(Duration::from_secs(1), "test.err", async {
            Err(StoreError::Duplicate("email".to_string()))
        })
        .await;
        assert!(matches!(err, Err(StoreError::Duplicate(_))));
    }
}
