//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 회원가입, 로그인, 로그아웃, 신원 확인

pub mod auth;
pub mod health;

pub use auth::{
    auth_router, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, RegisteredUser,
};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/auth", auth_router())
}
