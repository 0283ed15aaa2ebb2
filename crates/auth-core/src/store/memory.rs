//! 인메모리 저장소.
//!
//! 테스트와 단일 프로세스 개발 환경용입니다. 프로세스가 종료되면 내용이 사라집니다.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, RevocationStore};
use crate::domain::{RevokedToken, User};
use crate::error::StoreError;

/// 이메일 키 기반 사용자 저장소.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }
}

/// 폐기 목록 (저장 키 → 폐기 시각).
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장 키의 폐기 시각.
    pub async fn revoked_at(&self, key: &str) -> Option<i64> {
        self.entries.read().await.get(key).copied()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, record: &RevokedToken) -> Result<(), StoreError> {
        // 최초 폐기 시각 유지
        self.entries
            .write()
            .await
            .entry(record.token.clone())
            .or_insert(record.revoked_at);
        Ok(())
    }

    async fn is_revoked(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_credential_store_unique_email() {
        let store = InMemoryCredentialStore::new();
        store.insert(&user("a@x.com")).await.unwrap();

        let err = store.insert(&user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // 대소문자 구분
        store.insert(&user("A@x.com")).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_credential_store_lookup() {
        let store = InMemoryCredentialStore::new();
        let alice = user("alice@x.com");
        store.insert(&alice).await.unwrap();

        let found = store.find_by_email("alice@x.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));
        assert!(store.find_by_email("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revocation_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let first = RevokedToken {
            token: "tok".to_string(),
            revoked_at: 100,
        };
        let again = RevokedToken {
            token: "tok".to_string(),
            revoked_at: 200,
        };

        store.revoke(&first).await.unwrap();
        store.revoke(&again).await.unwrap();

        assert!(store.is_revoked("tok").await.unwrap());
        assert!(!store.is_revoked("other").await.unwrap());
        assert_eq!(store.revoked_at("tok").await, Some(100));
        assert_eq!(store.len().await, 1);
    }
}
