//! 인증 코어의 에러 타입.
//!
//! 저장소/암호화 계층의 에러는 [`AuthService`](crate::AuthService) 경계에서
//! [`AuthError`]로 변환됩니다. 호출자에게 원시 저수준 에러가 그대로 전달되지 않습니다.

use std::time::Duration;

use thiserror::Error;

/// 토큰 거부 사유.
///
/// 호출자에게는 하나의 "unauthorized" 응답으로 합쳐지지만,
/// 진단 로그와 메트릭에서는 구분됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// 서명 불일치 (변조되었거나 다른 시크릿으로 서명됨)
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    /// 파싱 불가 또는 필수 클레임 누락
    #[error("잘못된 토큰 형식")]
    Malformed,
    /// 만료 시각 경과
    #[error("토큰이 만료되었습니다")]
    Expired,
    /// 로그아웃으로 폐기됨
    #[error("폐기된 토큰입니다")]
    Revoked,
}

impl TokenRejection {
    /// 메트릭/로그 라벨.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::InvalidSignature => "invalid_signature",
            TokenRejection::Malformed => "malformed",
            TokenRejection::Expired => "expired",
            TokenRejection::Revoked => "revoked",
        }
    }
}

/// 저장소 계층 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 고유 키 충돌
    #[error("중복 레코드: {0}")]
    Duplicate(String),

    /// 저장소 호출 데드라인 초과
    #[error("저장소 응답 시간 초과: {operation} ({timeout:?})")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// 연결 실패 또는 쿼리 실패
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),

    /// 레코드를 도메인 타입으로 복원할 수 없음
    #[error("손상된 레코드: {0}")]
    Corrupt(String),
}

/// 인증 서비스 에러.
#[derive(Debug, Error)]
pub enum AuthError {
    /// 요청 페이로드 검증 실패
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 이미 등록된 이메일
    #[error("이미 등록된 이메일입니다")]
    DuplicateEmail,

    /// 존재하지 않는 이메일과 잘못된 비밀번호를 의도적으로 구분하지 않음
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 토큰 미제공
    #[error("인증 토큰이 필요합니다")]
    MissingToken,

    /// 서명 불일치, 만료, 폐기
    #[error("유효하지 않은 토큰")]
    TokenInvalid(TokenRejection),

    /// 저장소 타임아웃 또는 연결 실패
    #[error("저장소를 사용할 수 없습니다: {0}")]
    StoreUnavailable(String),

    /// 해싱/서명 실패
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 인증 작업 Result 타입.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 저장소 가용성 문제만 재시도 대상입니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }

    /// 안정적인 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::DuplicateEmail => "DUPLICATE_EMAIL",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::TokenInvalid(_) => "TOKEN_INVALID",
            AuthError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout { .. } | StoreError::Unavailable(_) => {
                AuthError::StoreUnavailable(err.to_string())
            }
            StoreError::Duplicate(_) | StoreError::Corrupt(_) => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TokenRejection> for AuthError {
    fn from(rejection: TokenRejection) -> Self {
        AuthError::TokenInvalid(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_errors_are_retryable() {
        assert!(AuthError::StoreUnavailable("timeout".to_string()).is_retryable());

        assert!(!AuthError::DuplicateEmail.is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::TokenInvalid(TokenRejection::Expired).is_retryable());
        assert!(!AuthError::Internal("hash".to_string()).is_retryable());
    }

    #[test]
    fn test_store_error_conversion() {
        let timeout = StoreError::Timeout {
            operation: "credentials.find_by_email",
            timeout: Duration::from_secs(3),
        };
        assert!(matches!(AuthError::from(timeout), AuthError::StoreUnavailable(_)));

        let corrupt = StoreError::Corrupt("bad uuid".to_string());
        assert!(matches!(AuthError::from(corrupt), AuthError::Internal(_)));
    }

    #[test]
    fn test_token_rejections_share_one_caller_message() {
        let expired = AuthError::from(TokenRejection::Expired);
        let revoked = AuthError::from(TokenRejection::Revoked);

        assert_eq!(expired.to_string(), revoked.to_string());
        assert_eq!(expired.code(), revoked.code());
        assert_ne!(TokenRejection::Expired.as_str(), TokenRejection::Revoked.as_str());
    }
}
