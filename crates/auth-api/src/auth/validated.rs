//! 요청 본문 스키마 검증 추출기.
//!
//! JSON 디코딩 실패와 `validator` 규칙 위반은 모두 도메인 로직 이전에
//! 400 `VALIDATION_ERROR`로 거부됩니다.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiErrorResponse;

/// 검증된 JSON 본문.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiErrorResponse::validation(rejection.body_text())),
            )
        })?;

        value.validate().map_err(|errors| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiErrorResponse::validation(validation_message(&errors))),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

/// 필드 에러 메시지를 하나의 문자열로 합칩니다.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}
