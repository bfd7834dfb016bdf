use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use blogroll_store::{parse_record_id, Database, StoreError};

use crate::authors;
use crate::blogposts;
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    /// `None` once the server has started shutting down.
    db: Arc<Mutex<Option<Database>>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(Some(db))),
            config: Arc::new(config),
        }
    }

    /// Run a store operation against the open database.
    ///
    /// `kind` names the record the operation is about, so a missing row
    /// becomes e.g. "Blogpost not found".
    pub async fn with_db<T>(
        &self,
        kind: &'static str,
        op: impl FnOnce(&Database) -> Result<T, StoreError>,
    ) -> Result<T, ServerError> {
        let guard = self.db.lock().await;
        let db = guard.as_ref().ok_or(ServerError::Unavailable)?;
        op(db).map_err(|e| ServerError::from_store(kind, e))
    }

    /// Detach the database so it can be closed.  Later requests get 503.
    pub async fn take_database(&self) -> Option<Database> {
        self.db.lock().await.take()
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/blogposts",
            get(blogposts::list_blogposts).post(blogposts::create_blogpost),
        )
        .route(
            "/blogposts/:id",
            get(blogposts::get_blogpost)
                .put(blogposts::update_blogpost)
                .delete(blogposts::delete_blogpost),
        )
        .route(
            "/blogposts/:id/comments",
            get(blogposts::list_comments).post(blogposts::add_comment),
        )
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/:id",
            put(authors::update_author)
                .get(authors::get_author)
                .delete(authors::delete_author),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Request helpers ───

/// A required text field: absent, `null` and `""` all count as missing.
pub(crate) fn required(field: &'static str, value: Option<String>) -> Result<String, ServerError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServerError::MissingField(field)),
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ServerError> {
    parse_record_id(raw).map_err(ServerError::from)
}

/// Updates must name the record they target in the body as well as the path.
pub(crate) fn ensure_ids_match(path_id: &str, body_id: Option<&str>) -> Result<Uuid, ServerError> {
    let id = parse_id(path_id)?;
    let body_matches = body_id
        .and_then(|raw| parse_record_id(raw).ok())
        .is_some_and(|body| body == id);

    if !body_matches {
        return Err(ServerError::IdMismatch {
            path: path_id.to_string(),
            body: body_id.unwrap_or_default().to_string(),
        });
    }
    Ok(id)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    pub fn test_app() -> (Router, AppState) {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::new(db, ServerConfig::ephemeral());
        (build_router(state.clone()), state)
    }

    /// Send one request and return the status plus the JSON body (`Null`
    /// when the body is empty).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn create_author(app: &Router, first: &str, last: &str, user: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/authors",
            Some(serde_json::json!({
                "firstName": first,
                "lastName": last,
                "userName": user,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["author"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_blogpost(app: &Router, title: &str, author_id: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/blogposts",
            Some(serde_json::json!({
                "title": title,
                "content": "C",
                "author_id": author_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["blogpost"]["id"].as_str().unwrap().to_string()
    }
}
