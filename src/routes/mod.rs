//! Router assembly: HTTP endpoints, WebSocket authoring, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket authoring at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/labs", get(http::http_list_labs))
        .route("/api/v1/labs/:slug/days", get(http::http_list_days))
        .route("/api/v1/labs/:slug/days/:day", get(http::http_get_day))
        .route("/api/v1/labs/:slug/days/:day/content", put(http::http_put_day_content))
        .route("/api/v1/blocks", post(http::http_post_block))
        .route("/api/v1/content/parse", post(http::http_post_parse))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::seeds::SEED_LAB_SLUG;

    fn app() -> Router {
        build_router(Arc::new(AppState::from_config(None)))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = call(app(), get_req("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn day_view_reports_primary() {
        let (status, body) = call(app(), get_req(&format!("/api/v1/labs/{SEED_LAB_SLUG}/days/3"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary"]["blockId"], "d3-video");
        assert_eq!(body["primary"]["gating"], true);
        assert_eq!(body["primary"]["video"], json!({ "provider": "youtube", "id": "dQw4w9WgXcQ" }));
        assert_eq!(body["blocks"][2]["type"], "quiz");
        assert_eq!(body["blocks"][2]["questions"][0]["correctIndex"], 1);
        assert_eq!(body["hasCustomPrompt"], true);
    }

    #[tokio::test]
    async fn missing_day_is_404() {
        let (status, body) = call(app(), get_req(&format!("/api/v1/labs/{SEED_LAB_SLUG}/days/77"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "DAY_NOT_FOUND");
        let (status, body) = call(app(), get_req("/api/v1/labs/unknown/days")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "LAB_NOT_FOUND");
    }

    #[tokio::test]
    async fn save_then_read_back() {
        let app = app();
        let uri = format!("/api/v1/labs/{SEED_LAB_SLUG}/days/4/content");
        let body = json!({
            "blocks": [{ "id": "v", "type": "video", "url": "https://youtu.be/dQw4w9WgXcQ", "role": "primary" }],
            "discussionPrompt": "¿Cómo te fue?"
        });
        let (status, saved) = call(app.clone(), json_req("PUT", &uri, body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["videoUrl"], "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(saved["revision"], 1);

        let (_, view) = call(app, get_req(&format!("/api/v1/labs/{SEED_LAB_SLUG}/days/4"))).await;
        assert_eq!(view["discussionPrompt"], "¿Cómo te fue?");
        assert_eq!(view["blocks"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn block_factory_endpoint() {
        let (status, block) = call(app(), json_req("POST", "/api/v1/blocks", json!({ "type": "challenge_steps" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(block["group"], "challenge");
        assert_eq!(block["steps"][0]["label"], "Paso 1");

        let (status, err) = call(app(), json_req("POST", "/api/v1/blocks", json!({ "type": "poll" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn parse_endpoint_handles_garbage() {
        let (status, out) = call(app(), json_req("POST", "/api/v1/content/parse", json!({ "content": "{not json" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["blocks"], json!([]));
        assert_eq!(out["primary"], Value::Null);
        assert_eq!(out["discussionPrompt"], "");
    }
}
