use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use blogroll_store::{Author, AuthorUpdate, NewAuthor};

use crate::api::{ensure_ids_match, parse_id, required, AppState};
use crate::error::ServerError;

const KIND: &str = "Author";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    user_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    user_name: Option<String>,
}

#[derive(Serialize)]
pub struct AuthorListResponse {
    authors: Vec<Author>,
}

#[derive(Serialize)]
pub struct AuthorResponse {
    author: Author,
}

pub async fn list_authors(
    State(state): State<AppState>,
) -> Result<Json<AuthorListResponse>, ServerError> {
    let authors = state.with_db(KIND, |db| db.list_authors()).await?;
    Ok(Json(AuthorListResponse { authors }))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuthorResponse>, ServerError> {
    let id = parse_id(&id)?;
    let author = state.with_db(KIND, |db| db.get_author(id)).await?;
    Ok(Json(AuthorResponse { author }))
}

pub async fn create_author(
    State(state): State<AppState>,
    payload: Result<Json<CreateAuthorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthorResponse>), ServerError> {
    let Json(req) = payload?;

    let new = NewAuthor {
        first_name: required("firstName", req.first_name)?,
        last_name: required("lastName", req.last_name)?,
        user_name: required("userName", req.user_name)?,
    };

    let author = state.with_db(KIND, |db| db.create_author(new)).await?;

    info!(id = %author.id, user_name = %author.user_name, "Author created via API");
    Ok((StatusCode::CREATED, Json(AuthorResponse { author })))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAuthorRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(req) = payload?;
    let id = ensure_ids_match(&id, req.id.as_deref())?;

    let update = AuthorUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        user_name: req.user_name,
    };

    state
        .with_db(KIND, |db| db.update_author(id, &update))
        .await?;

    info!(id = %id, "Author updated via API");
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the author and, in the same transaction, every blogpost that
/// references it.
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_id(&id)?;
    let removed_posts = state.with_db(KIND, |db| db.delete_author(id)).await?;

    info!(id = %id, removed_posts, "Author deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
