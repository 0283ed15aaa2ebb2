//! Axum용 세션 토큰 인증 추출기.
//!
//! 보호된 라우트는 [`AuthUser`]를 인자로 받아 검증 계약(서명 → 만료 → 폐기 목록)을
//! 따르게 됩니다. 실패 사유와 관계없이 호출자는 같은 401 응답을 받습니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    Json,
};

use auth_core::{AuthError, SessionIdentity};

use crate::error::{protected_auth_error, ApiErrorResponse};
use crate::state::AppState;

const BEARER_SCHEME: &str = "bearer";

/// Authorization 헤더에서 토큰 추출.
///
/// - 헤더가 없거나 비어 있으면 `None`
/// - `Bearer ` 접두사(대소문자 무시)가 있으면 제거
/// - 접두사가 없으면 값 전체를 토큰으로 간주
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        // 값 없이 스킴만 있는 경우
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// 인증 추출기.
///
/// ```rust,ignore
/// async fn protected_handler(AuthUser(identity): AuthUser) -> impl IntoResponse {
///     format!("Authenticated user: {}", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionIdentity);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = (StatusCode, Json<ApiErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| protected_auth_error(AuthError::MissingToken))?;

        let identity = state
            .auth
            .validate(&token)
            .await
            .map_err(protected_auth_error)?;

        Ok(AuthUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi".into()));
        assert_eq!(bearer_token(&headers("bearer abc.def.ghi")), Some("abc.def.ghi".into()));
        assert_eq!(bearer_token(&headers("BEARER  abc ")), Some("abc".into()));
    }

    #[test]
    fn test_bare_token_accepted() {
        assert_eq!(bearer_token(&headers("abc.def.ghi")), Some("abc.def.ghi".into()));
        // 접두사보다 짧은 값
        assert_eq!(bearer_token(&headers("abc")), Some("abc".into()));
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer    ")), None);
    }
}
