//! 인증 API 서버.
//!
//! 설정과 비밀 값을 검증한 뒤 저장소에 연결하고 Axum 서버를 시작합니다.
//! 서명 시크릿이나 저장소 연결 문자열이 없으면 포트를 열기 전에 종료합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use auth_api::metrics::setup_metrics_recorder;
use auth_api::middleware::metrics_layer;
use auth_api::openapi::swagger_ui_router;
use auth_api::repository::{PgCredentialStore, PgRevocationStore, RedisRevocationStore};
use auth_api::routes::create_api_router;
use auth_api::state::AppState;
use auth_core::{
    init_logging, AuthConfig, AuthService, CredentialStore, LogConfig, RevocationBackend,
    RevocationStore, Secrets,
};
use secrecy::ExposeSecret;

/// CORS 레이어 생성.
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://app.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// 설정된 폐기 목록 저장소 생성.
async fn create_revocation_store(
    config: &AuthConfig,
    secrets: &Secrets,
    pool: &sqlx::PgPool,
) -> anyhow::Result<Arc<dyn RevocationStore>> {
    match config.revocation.backend {
        RevocationBackend::Postgres => Ok(Arc::new(PgRevocationStore::new(pool.clone()))),
        RevocationBackend::Redis => {
            let url = secrets
                .redis_url
                .as_ref()
                .context("REDIS_URL is required for the redis revocation backend")?;
            let store = RedisRevocationStore::connect(url.expose_secret(), config.token.ttl())
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
    }
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 스펙을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    use auth_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    if std::env::args().any(|arg| arg == "--export-openapi") {
        println!("{}", serde_json::to_string_pretty(&ApiDoc::openapi())?);
        return Ok(true);
    }

    Ok(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    let config = AuthConfig::load_default().context("Failed to load configuration")?;

    init_logging(LogConfig::from_env_or(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Auth API server...");

    // 필수 비밀 값 검증 (누락 시 포트를 열기 전에 종료)
    let secrets = Secrets::from_env().map_err(|e| {
        error!(error = %e, "Missing required secret");
        e
    })?;
    secrets.require_backend(config.revocation.backend)?;

    let metrics_handle = setup_metrics_recorder().context("Failed to install metrics recorder")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(secrets.database_url())
        .await
        .context("Failed to connect to database")?;
    info!("Connected to PostgreSQL successfully");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        info!("Database migrations applied");
    }

    let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let revocations = create_revocation_store(&config, &secrets, &pool).await?;

    let auth = AuthService::new(&config, &secrets.jwt_secret, credentials, revocations)?;
    let state = Arc::new(AppState::new(Arc::new(auth)).with_db_pool(pool));

    info!(
        version = %state.version,
        revocation_backend = ?config.revocation.backend,
        revocation_key_mode = ?config.revocation.key_mode,
        token_ttl_hours = config.token.ttl_hours,
        store_timeout_ms = config.store.timeout_ms,
        "Application state initialized"
    );

    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환하여 진행 중인 요청을 마무리하게 합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("Shutdown signal received");
}
