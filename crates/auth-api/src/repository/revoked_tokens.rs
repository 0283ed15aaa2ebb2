//! Revoked Tokens Repository
//!
//! `revoked_tokens` 테이블 기반 폐기 목록. 같은 키의 재폐기는
//! `ON CONFLICT DO NOTHING`으로 무시되어 최초 폐기 시각이 유지됩니다.

use async_trait::async_trait;
use sqlx::PgPool;

use auth_core::{RevocationStore, RevokedToken, StoreError};

use super::store_error;

/// PostgreSQL 폐기 목록 저장소.
#[derive(Debug, Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, record: &RevokedToken) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token, revoked_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(&record.token)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn is_revoked(&self, key: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token = $1)",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
