//! HTTP 경계의 인증 처리.
//!
//! - [`bearer_token`]: Authorization 헤더 파싱
//! - [`AuthUser`]: 보호된 라우트용 추출기
//! - [`ValidatedJson`]: 요청 본문 스키마 검증

pub mod middleware;
pub mod validated;

pub use middleware::{bearer_token, AuthUser};
pub use validated::{validation_message, ValidatedJson};
