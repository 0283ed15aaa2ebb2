//! 사용자 모델.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 자격증명 저장소의 사용자 레코드.
///
/// `Serialize`를 구현하지 않습니다. 외부 응답에는 반드시 [`PublicUser`]를 사용합니다.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    /// 생성 시 부여되는 불변 식별자
    pub id: Uuid,
    /// 표시 이름
    pub name: String,
    /// 이메일 (저장된 그대로 대소문자 구분, 고유)
    pub email: String,
    /// PHC 형식 비밀번호 해시 (평문 아님)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 해시를 제거한 공개 표현.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// 외부 호출자에게 반환되는 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 회원가입 입력.
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}
