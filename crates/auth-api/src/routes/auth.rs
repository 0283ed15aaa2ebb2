//! 인증 endpoint.
//!
//! - `POST /register` - 회원가입
//! - `POST /login` - 로그인 (세션 토큰 발급)
//! - `POST /logout` - 로그아웃 (토큰 폐기)
//! - `GET /me` - 현재 토큰의 신원 확인

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use auth_core::{AuthError, PublicUser, Registration, SessionIdentity};

use crate::auth::{bearer_token, AuthUser, ValidatedJson};
use crate::error::{auth_error, ApiErrorResponse, ApiResult};
use crate::metrics::{record_login, record_logout, record_register};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 회원가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 이메일 (대소문자 구분)
    #[validate(email(message = "올바른 이메일 형식이 아닙니다"))]
    pub email: String,
    /// 비밀번호
    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
    /// 표시 이름 (선택)
    #[serde(default)]
    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    pub name: String,
}

/// 회원가입 응답의 사용자 정보.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// 회원가입 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "이메일을 입력해주세요"))]
    pub email: String,
    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// 비밀번호 해시가 제거된 사용자 정보
    pub user: PublicUser,
    /// 세션 토큰 (24시간 유효)
    pub token: String,
}

/// 단순 메시지 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== 핸들러 ====================

/// 회원가입.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 완료", body = RegisterResponse),
        (status = 400, description = "입력 오류 또는 중복 이메일", body = ApiErrorResponse),
        (status = 503, description = "저장소 사용 불가", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state
        .auth
        .register(Registration::new(request.email, request.password, request.name))
        .await
        .map_err(auth_error)?;

    record_register();

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User successfully registered".to_string(),
            user: RegisteredUser {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

/// 로그인.
///
/// 미가입 이메일과 잘못된 비밀번호는 동일한 401 응답을 반환합니다.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 400, description = "입력 오류", body = ApiErrorResponse),
        (status = 401, description = "이메일 또는 비밀번호 불일치", body = ApiErrorResponse),
        (status = 503, description = "저장소 사용 불가", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.auth.login(&request.email, &request.password).await {
        Ok(outcome) => {
            record_login("success");
            Ok(Json(LoginResponse {
                user: outcome.user,
                token: outcome.token,
            }))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                record_login("failure");
            }
            Err(auth_error(e))
        }
    }
}

/// 로그아웃.
///
/// 토큰의 서명/만료를 확인하지 않고 폐기 목록에 추가합니다.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "로그아웃 완료", body = MessageResponse),
        (status = 400, description = "토큰 미제공", body = ApiErrorResponse),
        (status = 503, description = "저장소 사용 불가", body = ApiErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    let token = bearer_token(&headers);
    state
        .auth
        .logout(token.as_deref())
        .await
        .map_err(auth_error)?;

    record_logout();

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

/// 현재 토큰의 신원.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "유효한 토큰", body = SessionIdentity),
        (status = 401, description = "토큰 누락, 만료, 폐기 또는 위조", body = ApiErrorResponse)
    )
)]
pub async fn me(AuthUser(identity): AuthUser) -> Json<SessionIdentity> {
    Json(identity)
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{create_test_state, create_test_state_with_clock};
    use auth_core::FixedClock;
    use axum::{body::Body, http::Request, response::Response};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(state: AppState) -> Router {
        Router::new()
            .nest("/api/v1/auth", auth_router())
            .with_state(Arc::new(state))
    }

    fn app() -> Router {
        app_with(create_test_state())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_auth(method: &str, uri: &str, authorization: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", authorization)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn register_and_login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/register",
                json!({"email": "a@x.com", "password": "secret123", "name": "Al"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "a@x.com", "password": "secret123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_created() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/auth/register",
                json!({"email": "a@x.com", "password": "secret123", "name": "Al"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["message"], "User successfully registered");
        assert_eq!(body["user"]["email"], "a@x.com");
        assert_eq!(body["user"]["name"], "Al");
        assert!(body["user"]["id"].is_string());
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_name_optional() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/auth/register",
                json!({"email": "a@x.com", "password": "secret123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["user"]["name"], "");
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let app = app();
        let request = || {
            post_json(
                "/api/v1/auth/register",
                json!({"email": "a@x.com", "password": "secret123", "name": "Al"}),
            )
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(second).await["code"], "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let cases = [
            json!({"email": "not-an-email", "password": "secret123"}),
            json!({"email": "a@x.com", "password": ""}),
            json!({"email": "a@x.com", "password": "secret123", "name": "x".repeat(101)}),
            json!({"password": "secret123"}),
        ];

        for body in cases {
            let response = app()
                .oneshot(post_json("/api/v1/auth/register", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_login_returns_user_and_token() {
        let app = app();
        let token = register_and_login(&app).await;
        assert_eq!(token.split('.').count(), 3);

        let response = app
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "a@x.com", "password": "secret123"}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["user"]["email"], "a@x.com");
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let app = app();
        register_and_login(&app).await;

        let wrong = app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "a@x.com", "password": "wrongpass"}),
            ))
            .await
            .unwrap();
        let unknown = app
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "nobody@x.com", "password": "secret123"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

        let wrong = json_body(wrong).await;
        assert_eq!(wrong, json_body(unknown).await);
        assert_eq!(wrong["error"], "invalid email or password");
    }

    #[tokio::test]
    async fn test_logout_without_header() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "MISSING_TOKEN");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = app();
        let token = register_and_login(&app).await;
        let bearer = format!("Bearer {}", token);

        let response = app
            .clone()
            .oneshot(with_auth("GET", "/api/v1/auth/me", &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["email"], "a@x.com");

        let response = app
            .clone()
            .oneshot(with_auth("POST", "/api/v1/auth/logout", &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Successfully logged out");

        let response = app
            .clone()
            .oneshot(with_auth("GET", "/api/v1/auth/me", &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "TOKEN_INVALID");

        // 재폐기도 성공
        let response = app
            .oneshot(with_auth("POST", "/api/v1/auth/logout", &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_accepts_invalid_token() {
        let response = app()
            .oneshot(with_auth("POST", "/api/v1/auth/logout", "Bearer not-a-jwt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(with_auth("GET", "/api/v1/auth/me", "Bearer forged.token.value"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let clock = Arc::new(FixedClock::default());
        let app = app_with(create_test_state_with_clock(clock.clone()));
        let token = register_and_login(&app).await;
        let bearer = format!("Bearer {}", token);

        clock.advance(chrono::Duration::hours(24));

        let response = app
            .oneshot(with_auth("GET", "/api/v1/auth/me", &bearer))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "unauthorized");
    }
}
