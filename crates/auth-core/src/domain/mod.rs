//! 인증 도메인 모델.
//!
//! - [`User`]: 자격증명 저장소의 사용자 레코드 (비밀번호 해시 포함)
//! - [`PublicUser`]: 외부로 반환되는 사용자 정보 (해시 제거)
//! - [`RevokedToken`]: 폐기 목록 레코드

mod revocation;
mod user;

pub use revocation::{RevocationKeyMode, RevokedToken, MAX_RAW_KEY_LEN};
pub use user::{PublicUser, Registration, User};
