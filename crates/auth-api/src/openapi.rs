//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth_core::{PublicUser, SessionIdentity};

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, LoginRequest, LoginResponse,
    MessageResponse, RegisterRequest, RegisterResponse, RegisteredUser,
};

/// Auth API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Auth API",
        description = r#"
# 인증 서비스 REST API

회원가입, 로그인, 로그아웃(세션 토큰 폐기)을 제공합니다.

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
토큰은 발급 후 24시간 동안 유효하며, 로그아웃하면 즉시 무효화됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 회원가입, 로그인, 로그아웃")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            RegisterRequest,
            RegisterResponse,
            RegisteredUser,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            PublicUser,
            SessionIdentity,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Auth =====
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
    )
)]
pub struct ApiDoc;

/// Bearer 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
