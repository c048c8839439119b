//! Admin API for the background poller and key pool
//!
//! Endpoints:
//! - GET  /api/admin/status : poller, key pool and overall health
//! - POST /api/admin/background/start : start the tick loop
//! - POST /api/admin/background/stop : stop the tick loop
//! - POST /api/admin/background/force-fetch : run one cycle now
//! - GET  /api/admin/background/status : poller counters
//! - GET  /api/admin/youtube/quota : per-key quota status

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use tracing::info;

use crate::error::{ApiError, json_response};
use crate::service::AppServices;

/// Build the admin router.
pub fn build_admin_router(services: AppServices) -> Router {
    Router::new()
        .route("/api/admin/status", get(system_status))
        .route("/api/admin/background/start", post(start_background))
        .route("/api/admin/background/stop", post(stop_background))
        .route("/api/admin/background/force-fetch", post(force_fetch))
        .route("/api/admin/background/status", get(background_status))
        .route("/api/admin/youtube/quota", get(quota_status))
        .with_state(services)
}

async fn system_status(State(services): State<AppServices>) -> Result<Response, ApiError> {
    json_response(StatusCode::OK, &services.get_system_status().await)
}

/// POST /api/admin/background/start. Starting a running poller is a no-op
/// and still returns 200.
async fn start_background(State(services): State<AppServices>) -> Result<Response, ApiError> {
    let message = services.start_polling().await;
    info!(outcome = message.message, "admin start requested");
    json_response(StatusCode::OK, &message)
}

async fn stop_background(State(services): State<AppServices>) -> Result<Response, ApiError> {
    let message = services.stop_polling().await;
    info!(outcome = message.message, "admin stop requested");
    json_response(StatusCode::OK, &message)
}

/// POST /api/admin/background/force-fetch. A failed cycle is reported in the
/// body with `success: false`, not as an HTTP error.
async fn force_fetch(State(services): State<AppServices>) -> Result<Response, ApiError> {
    json_response(StatusCode::OK, &services.force_tick().await)
}

async fn background_status(State(services): State<AppServices>) -> Result<Response, ApiError> {
    json_response(StatusCode::OK, &services.get_poller_status().await)
}

async fn quota_status(State(services): State<AppServices>) -> Result<Response, ApiError> {
    json_response(StatusCode::OK, &services.get_credential_status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn status_reports_all_components() {
        let services = test_services(StubProvider::videos(&[]), &["key-aaaa", "key-bbbb"]);
        let app = build_admin_router(services);

        let response = app.oneshot(get_request("/api/admin/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let json = body_json(response).await;
        assert_eq!(json["system"]["status"], "stopped");
        assert_eq!(json["background_service"]["running"], false);
        assert_eq!(json["background_service"]["query"], "python programming");
        assert_eq!(json["youtube_api"]["total_keys"], 2);
        assert_eq!(json["youtube_api"]["keys"][1]["key_suffix"], "...bbbb");
    }

    #[tokio::test]
    async fn start_then_stop_via_api() {
        let services = test_services(StubProvider::videos(&[]), &["key-aaaa"]);
        let app = build_admin_router(services.clone());

        let response = app
            .clone()
            .oneshot(post_request("/api/admin/background/start"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Background fetching started successfully");

        let response = app
            .clone()
            .oneshot(post_request("/api/admin/background/start"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["message"], "Background fetching is already running");

        let response = app
            .clone()
            .oneshot(get_request("/api/admin/background/status"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["running"], true);

        let response = app
            .oneshot(post_request("/api/admin/background/stop"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["message"], "Background fetching stopped successfully");
        assert!(!services.poller.is_running());
    }

    #[tokio::test]
    async fn stop_when_not_running_is_ok() {
        let services = test_services(StubProvider::videos(&[]), &["key-aaaa"]);
        let app = build_admin_router(services);

        let response = app
            .oneshot(post_request("/api/admin/background/stop"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Background fetching is not running");
    }

    #[tokio::test]
    async fn force_fetch_returns_tick_result() {
        let services = test_services(StubProvider::videos(&["v1", "v2"]), &["key-aaaa"]);
        let app = build_admin_router(services);

        let response = app
            .oneshot(post_request("/api/admin/background/force-fetch"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(
            json["message"],
            "Fetch completed: 2 fetched, 2 created, 0 updated, 0 failed"
        );
        assert!(json["duration_seconds"].is_number());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn force_fetch_failure_is_200_with_success_false() {
        let services = test_services(StubProvider::quota_exceeded(), &["key-aaaa"]);
        let app = build_admin_router(services);

        let response = app
            .clone()
            .oneshot(post_request("/api/admin/background/force-fetch"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(
            json["message"].as_str().unwrap().starts_with("Fetch failed"),
            "got: {}",
            json["message"]
        );

        let response = app
            .oneshot(get_request("/api/admin/youtube/quota"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["exhausted_keys"], 1);
        assert_eq!(json["keys"][0]["is_exhausted"], true);
        assert_eq!(json["status"], "unhealthy");
    }

    #[tokio::test]
    async fn quota_status_never_exposes_full_keys() {
        let services = test_services(StubProvider::videos(&[]), &["AIzaSyFullSecretKey9876"]);
        let app = build_admin_router(services);

        let response = app
            .oneshot(get_request("/api/admin/youtube/quota"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert!(!json.to_string().contains("AIzaSyFullSecretKey"));
        assert_eq!(json["keys"][0]["key_suffix"], "...9876");
        assert_eq!(json["current_key_index"], 0);
    }

    #[tokio::test]
    async fn start_requires_post() {
        let services = test_services(StubProvider::videos(&[]), &["key-aaaa"]);
        let app = build_admin_router(services);

        let response = app
            .oneshot(get_request("/api/admin/background/start"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
