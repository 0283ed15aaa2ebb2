//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트는 `{ "error": ..., "code": ... }` 형식으로 실패를 반환합니다.
//! [`AuthError`]는 [`auth_error`]에서 한 곳에 모여 HTTP 상태로 변환되며,
//! 호출자에게 노출되는 메시지는 저수준 원인을 포함하지 않습니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use auth_core::AuthError;

use crate::metrics::record_token_rejection;

/// 로그인 실패 시 고정 메시지 (미가입 이메일과 잘못된 비밀번호를 구분하지 않음).
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "error": "invalid email or password",
///   "code": "INVALID_CREDENTIALS"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
    /// 에러 코드 (예: "VALIDATION_ERROR", "TOKEN_INVALID")
    pub code: String,
}

impl ApiErrorResponse {
    /// 에러 응답 생성.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    /// 입력 검증 실패 응답.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 인증 에러를 HTTP 응답으로 변환.
///
/// `MissingToken`은 로그아웃 요청 형식 오류로 보고 400을 반환합니다.
/// 보호된 라우트에서는 [`protected_auth_error`]를 사용합니다.
pub fn auth_error(err: AuthError) -> (StatusCode, Json<ApiErrorResponse>) {
    let code = err.code();
    let (status, message) = match &err {
        AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::DuplicateEmail => (
            StatusCode::BAD_REQUEST,
            "email already registered".to_string(),
        ),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ),
        AuthError::MissingToken => (StatusCode::BAD_REQUEST, "No token provided".to_string()),
        AuthError::TokenInvalid(reason) => {
            record_token_rejection(reason.as_str());
            (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
        }
        AuthError::StoreUnavailable(detail) => {
            warn!(detail = %detail, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "service temporarily unavailable".to_string(),
            )
        }
        AuthError::Internal(detail) => {
            error!(detail = %detail, "Internal auth failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    };

    (status, Json(ApiErrorResponse::new(code, message)))
}

/// 보호된 라우트용 변환 (토큰 누락도 401).
pub fn protected_auth_error(err: AuthError) -> (StatusCode, Json<ApiErrorResponse>) {
    match err {
        AuthError::MissingToken => (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new(
                AuthError::MissingToken.code(),
                "unauthorized",
            )),
        ),
        other => auth_error(other),
    }
}
