//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 경우(테스트 등) 기록 함수는 아무 일도 하지 않습니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # Errors
///
/// 레코더가 이미 설치되어 있거나 버킷 설정이 잘못된 경우.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 회원가입 성공 카운터 증가.
pub fn record_register() {
    counter!("auth_register_total").increment(1);
}

/// 로그인 시도 카운터 증가 (result: "success" | "failure").
pub fn record_login(result: &'static str) {
    counter!("auth_login_total", "result" => result).increment(1);
}

/// 로그아웃 카운터 증가.
pub fn record_logout() {
    counter!("auth_logout_total").increment(1);
}

/// 토큰 거부 카운터 증가 (reason: 거부 사유 라벨).
pub fn record_token_rejection(reason: &'static str) {
    counter!("auth_token_rejections_total", "reason" => reason).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/users/123e4567-e89b-12d3-a456-426614174000` → `/users/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
