//! Redis 폐기 목록 저장소.
//!
//! 폐기 키는 토큰 최대 수명만큼의 TTL로 저장되어, 토큰이 자연 만료된 뒤에는
//! 별도 정리 없이 사라집니다.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::info;

use auth_core::{RevocationStore, RevokedToken, StoreError};

/// 폐기 키 접두사.
const KEY_PREFIX: &str = "auth:revoked:";

/// Redis 폐기 목록 저장소.
#[derive(Clone)]
pub struct RedisRevocationStore {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisRevocationStore {
    /// Redis에 연결합니다.
    ///
    /// `token_ttl`은 발급 토큰의 수명이며, 폐기 키의 만료 시간으로 사용됩니다.
    pub async fn connect(url: &str, token_ttl: chrono::Duration) -> Result<Self, StoreError> {
        info!("Connecting to Redis...");

        let client = Client::open(url).map_err(redis_error)?;
        let connection = client.get_connection_manager().await.map_err(redis_error)?;

        info!("Redis connection established");

        Ok(Self {
            connection,
            ttl_secs: token_ttl.num_seconds().max(1) as u64,
        })
    }

    fn key(stored: &str) -> String {
        format!("{}{}", KEY_PREFIX, stored)
    }
}

fn redis_error(err: redis::RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, record: &RevokedToken) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        // NX: 최초 폐기 시각 유지
        let _: Option<String> = redis::cmd("SET")
            .arg(Self::key(&record.token))
            .arg(record.revoked_at)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        Ok(())
    }

    async fn is_revoked(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(Self::key(key)).await.map_err(redis_error)?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("unexpected PING reply: {}", pong)))
        }
    }
}
