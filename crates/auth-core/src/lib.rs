//! # Auth Core
//!
//! 인증 서비스의 핵심 도메인 로직을 제공합니다.
//!
//! 이 크레이트는 HTTP 계층과 무관한 인증 구성요소를 제공합니다:
//! - 사용자 및 폐기 토큰 모델
//! - Argon2id 비밀번호 해싱
//! - 세션 토큰(JWT) 발급 및 검증
//! - 자격증명/폐기 목록 저장소 추상화와 인메모리 구현
//! - 회원가입, 로그인, 로그아웃을 조합하는 [`AuthService`]
//! - 설정 관리 및 로깅 인프라

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use password::{validate_password_strength, PasswordError, PasswordHasher};
pub use service::{AuthService, LoginOutcome};
pub use store::{
    with_deadline, CredentialStore, InMemoryCredentialStore, InMemoryRevocationStore,
    RevocationStore,
};
pub use token::{token_fingerprint, Claims, SessionIdentity, TokenIssuer, TokenValidator};
