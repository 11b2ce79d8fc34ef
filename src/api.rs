//! HTTP surface — the `/query` chat endpoint and a health probe.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::dispatch::Dispatcher;

/// Incoming chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "unknown_user")]
    pub user_name: String,
}

fn unknown_user() -> String {
    "Unknown".to_string()
}

/// Reply to a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub text: String,
}

/// Shared state for the query routes.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the Axum router.
pub fn query_routes(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(AppState { dispatcher })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "health-onboard"
    }))
}

/// POST /query
async fn query(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> impl IntoResponse {
    match state.dispatcher.handle(&req.text, &req.user_name).await {
        Ok(reply) => Json(QueryResponse { text: reply.text }).into_response(),
        Err(e) => {
            error!(user = %req.user_name, error = %e, "Query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::checkin::StaticCheckIn;
    use crate::onboarding::Stage;
    use crate::onboarding::prompts::question;
    use crate::store::{DEFAULT_SESSION_FILE, SessionStore};

    fn app(dir: &TempDir) -> Router {
        let dispatcher = Dispatcher::new(
            dir.path().join(DEFAULT_SESSION_FILE),
            Arc::new(StaticCheckIn::default()),
        );
        query_routes(Arc::new(dispatcher))
    }

    async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn query_returns_text() {
        let dir = TempDir::new().unwrap();
        let (status, json) = post_json(
            app(&dir),
            serde_json::json!({"text": "hi", "user_name": "alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["text"], question(Stage::Age));
    }

    #[tokio::test]
    async fn missing_user_name_defaults_to_unknown() {
        let dir = TempDir::new().unwrap();
        let (status, _) = post_json(app(&dir), serde_json::json!({"text": "hi"})).await;
        assert_eq!(status, StatusCode::OK);

        let store = SessionStore::load(dir.path().join(DEFAULT_SESSION_FILE)).await;
        assert_eq!(store.get("Unknown").unwrap().session_id, "Unknown-session");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(&dir).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
