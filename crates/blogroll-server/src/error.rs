use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blogroll_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Request path id ({path}) and request body id ({body}) must match")]
    IdMismatch { path: String, body: String },

    #[error("Author not found: {0}")]
    UnknownAuthor(Uuid),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable")]
    Unavailable,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl ServerError {
    /// Translate a store failure on a record of the given kind.
    pub fn from_store(kind: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServerError::NotFound(kind),
            StoreError::InvalidIdentifier(id) => ServerError::InvalidId(id),
            StoreError::Validation { field } => ServerError::MissingField(field),
            StoreError::Conflict(detail) => ServerError::Conflict(detail),
            StoreError::UnknownAuthor(id) => ServerError::UnknownAuthor(id),
            other => ServerError::Store(other),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        Self::from_store("Record", err)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::MissingField(_)
            | ServerError::BadRequest(_)
            | ServerError::InvalidId(_)
            | ServerError::IdMismatch { .. }
            | ServerError::UnknownAuthor(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Conflict(_) => {
                (StatusCode::CONFLICT, "userName is already taken".to_string())
            }
            ServerError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ServerError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_distinct_kinds() {
        assert!(matches!(
            ServerError::from_store("Blogpost", StoreError::NotFound),
            ServerError::NotFound("Blogpost")
        ));
        assert!(matches!(
            ServerError::from(StoreError::Validation { field: "title" }),
            ServerError::MissingField("title")
        ));
        assert!(matches!(
            ServerError::from(StoreError::Migration("boom".into())),
            ServerError::Store(_)
        ));
    }

    #[test]
    fn status_codes() {
        let cases = [
            (ServerError::MissingField("content"), StatusCode::BAD_REQUEST),
            (
                ServerError::IdMismatch {
                    path: "a".into(),
                    body: "b".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (ServerError::NotFound("Author"), StatusCode::NOT_FOUND),
            (ServerError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServerError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                ServerError::Store(StoreError::NoDataDir),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
