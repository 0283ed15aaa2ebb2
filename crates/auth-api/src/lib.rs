//! 인증 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 회원가입/로그인/로그아웃 REST API
//! - 세션 토큰 인증 추출기
//! - PostgreSQL/Redis 저장소 구현
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: Authorization 헤더 파싱, 인증/검증 추출기
//! - [`repository`]: 저장소 구현
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{bearer_token, AuthUser, ValidatedJson};
pub use error::{auth_error, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with_clock};
