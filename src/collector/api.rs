//! HTTP routes of the event collector.
//!
//! - `GET /objects.json` - graph description, read from the data directory
//! - `GET /mapping.json` - label to log-name mapping
//! - `POST /events` - ingest one event
//! - `GET /events` - retained events, oldest first
//! - `GET /api/stats` - retention counters
//!
//! Anything else falls through to the static directory when one is set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::convert::{MAPPING_FILE, OBJECTS_FILE};

use super::store::{EventLog, LogStats, StoredEvent};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub events: Arc<RwLock<EventLog>>,
    pub data_dir: Arc<PathBuf>,
}

impl ApiState {
    pub fn new(data_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(EventLog::new(capacity))),
            data_dir: Arc::new(data_dir.into()),
        }
    }

    /// Stamp and store a posted object, returning the assigned id
    pub async fn ingest(&self, mut body: Map<String, Value>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();

        body.insert("id".into(), Value::String(id.clone()));
        body.insert("timestamp".into(), Value::from(timestamp));
        body.entry("details").or_insert_with(|| Value::Object(Map::new()));

        let details = &body["details"];
        let field = |key: &str| details.get(key).and_then(|v| v.as_str()).unwrap_or("-");
        let (source, deliver_to, operation) =
            (field("source"), field("deliver_to"), field("operation"));
        info!(event_id = %id, source, deliver_to, operation, "Event received");

        self.events.write().await.push(body);
        id
    }

    pub async fn snapshot(&self) -> Vec<StoredEvent> {
        self.events.read().await.snapshot()
    }

    pub async fn stats(&self) -> LogStats {
        self.events.read().await.stats()
    }
}

/// Build the router; `static_dir` is served as fallback when given
pub fn create_router(state: ApiState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/objects.json", get(get_objects))
        .route("/mapping.json", get(get_mapping))
        .route("/events", get(get_events).post(post_event))
        .route("/api/stats", get(get_stats))
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn serve_artifact(state: &ApiState, name: &str) -> Response {
    let path = state.data_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Artifact missing");
            (StatusCode::NOT_FOUND, format!("{name} not found")).into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read artifact");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn get_objects(State(state): State<ApiState>) -> Response {
    serve_artifact(&state, OBJECTS_FILE).await
}

async fn get_mapping(State(state): State<ApiState>) -> Response {
    serve_artifact(&state, MAPPING_FILE).await
}

/// `Json<Map>` rejects bodies that are not JSON objects with a 4xx
async fn post_event(
    State(state): State<ApiState>,
    Json(body): Json<Map<String, Value>>,
) -> Json<Value> {
    let id = state.ingest(body).await;
    Json(json!({ "message": "Event received", "id": id }))
}

async fn get_events(State(state): State<ApiState>) -> Json<Vec<StoredEvent>> {
    Json(state.snapshot().await)
}

async fn get_stats(State(state): State<ApiState>) -> Json<LogStats> {
    Json(state.stats().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tower::ServiceExt;

    use crate::core::parse_events;

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_event_stamps_and_acks() {
        let state = ApiState::new(".", 100);
        let app = create_router(state.clone(), None);

        let response = app
            .oneshot(post(
                r#"{"details": {"source": "svc-a", "deliver_to": "svc-b", "operation": "send", "size": 3}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let ack = body_json(response).await;
        assert_eq!(ack["message"], "Event received");
        let id = ack["id"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let stored = state.snapshot().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], id.as_str());
        assert!(stored[0]["timestamp"].as_i64().unwrap() > 0);
        assert_eq!(stored[0]["details"]["size"], 3);
    }

    #[tokio::test]
    async fn test_post_without_details_gets_empty_object() {
        let state = ApiState::new(".", 100);
        let app = create_router(state.clone(), None);

        let response = app.oneshot(post(r#"{"note": "hi"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = state.snapshot().await;
        assert_eq!(stored[0]["details"], json!({}));
        assert_eq!(stored[0]["note"], "hi");
    }

    #[tokio::test]
    async fn test_post_rejects_non_object() {
        let app = create_router(ApiState::new(".", 100), None);
        let response = app.clone().oneshot(post("not json")).await.unwrap();
        assert!(response.status().is_client_error());

        let response = app.oneshot(post("[1, 2]")).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_get_events_retains_last_window() {
        let state = ApiState::new(".", 100);
        let app = create_router(state.clone(), None);

        for n in 0..105 {
            let body = format!(r#"{{"details": {{"source": "a", "deliver_to": "b", "operation": "op{n}"}}}}"#);
            let response = app.clone().oneshot(post(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let events = parse_events(std::str::from_utf8(&bytes).unwrap()).unwrap();

        assert_eq!(events.len(), 100);
        assert_eq!(events[0].operation(), "op5");
        assert_eq!(events[99].operation(), "op104");
    }

    #[tokio::test]
    async fn test_stats() {
        let state = ApiState::new(".", 2);
        let app = create_router(state.clone(), None);
        for _ in 0..3 {
            app.clone().oneshot(post("{}")).await.unwrap();
        }

        let stats = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
        assert_eq!(stats, json!({"retained": 2, "capacity": 2, "total_received": 3}));
    }

    #[tokio::test]
    async fn test_serves_artifacts_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(OBJECTS_FILE), r#"{"nodes":[],"edges":[]}"#).unwrap();
        let app = create_router(ApiState::new(dir.path(), 100), None);

        let response = app.clone().oneshot(get("/objects.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_json(response).await, json!({"nodes": [], "edges": []}));

        // checked per request, not only at startup
        let response = app.oneshot(get("/mapping.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>archflow</html>").unwrap();
        let app = create_router(ApiState::new(".", 100), Some(dir.path()));

        let response = app.clone().oneshot(get("/index.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/missing.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
