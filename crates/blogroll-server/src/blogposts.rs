//! Blogpost routes.
//!
//! ```text
//! GET    /blogposts[?author_id=<uuid>]
//! GET    /blogposts/:id
//! POST   /blogposts            {"title", "content", "author_id"}
//! PUT    /blogposts/:id        {"id", "title"?, "content"?}
//! DELETE /blogposts/:id
//! GET    /blogposts/:id/comments
//! POST   /blogposts/:id/comments {"content"}
//! ```

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use blogroll_store::{BlogpostFilter, BlogpostUpdate, Comment, NewBlogpost, SerializedBlogpost};

use crate::api::{ensure_ids_match, parse_id, required, AppState};
use crate::error::ServerError;

const KIND: &str = "Blogpost";

#[derive(Deserialize)]
pub struct ListQuery {
    author_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBlogpostRequest {
    title: Option<String>,
    content: Option<String>,
    #[serde(alias = "author")]
    author_id: Option<String>,
}

/// Only `title` and `content` are copied into the update; any other key in
/// the body is ignored.
#[derive(Deserialize)]
pub struct UpdateBlogpostRequest {
    id: Option<String>,
    title: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    content: Option<String>,
}

#[derive(Serialize)]
pub struct BlogpostListResponse {
    blogposts: Vec<SerializedBlogpost>,
}

#[derive(Serialize)]
pub struct BlogpostResponse {
    blogpost: SerializedBlogpost,
}

#[derive(Serialize)]
pub struct CommentListResponse {
    comments: Vec<Comment>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

pub async fn list_blogposts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<BlogpostListResponse>, ServerError> {
    let filter = BlogpostFilter {
        author_id: query.author_id.as_deref().map(parse_id).transpose()?,
    };

    let posts = state
        .with_db(KIND, |db| db.list_populated_blogposts(&filter))
        .await?;

    Ok(Json(BlogpostListResponse {
        blogposts: posts.iter().map(|p| p.serialize()).collect(),
    }))
}

pub async fn get_blogpost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogpostResponse>, ServerError> {
    let id = parse_id(&id)?;
    let post = state
        .with_db(KIND, |db| db.get_populated_blogpost(id))
        .await?;

    Ok(Json(BlogpostResponse {
        blogpost: post.serialize(),
    }))
}

pub async fn create_blogpost(
    State(state): State<AppState>,
    payload: Result<Json<CreateBlogpostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogpostResponse>), ServerError> {
    let Json(req) = payload?;

    let new = NewBlogpost {
        title: required("title", req.title)?,
        content: required("content", req.content)?,
        author_id: parse_id(&required("author_id", req.author_id)?)?,
    };

    let post = state
        .with_db(KIND, |db| {
            let created = db.create_blogpost(new)?;
            db.populate(created)
        })
        .await?;

    info!(id = %post.blogpost.id, author_id = %post.author.id, "Blogpost created via API");

    Ok((
        StatusCode::CREATED,
        Json(BlogpostResponse {
            blogpost: post.serialize(),
        }),
    ))
}

pub async fn update_blogpost(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBlogpostRequest>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(req) = payload?;
    let id = ensure_ids_match(&id, req.id.as_deref())?;

    let update = BlogpostUpdate {
        title: req.title,
        content: req.content,
    };

    state
        .with_db(KIND, |db| db.update_blogpost(id, &update))
        .await?;

    info!(id = %id, "Blogpost updated via API");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_blogpost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_id(&id)?;
    state.with_db(KIND, |db| db.delete_blogpost(id)).await?;

    info!(id = %id, "Blogpost deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommentListResponse>, ServerError> {
    let id = parse_id(&id)?;
    let comments = state.with_db(KIND, |db| db.list_comments(id)).await?;
    Ok(Json(CommentListResponse { comments }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), ServerError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let content = required("content", req.content)?;

    let comment = state
        .with_db(KIND, |db| db.add_comment(id, &content))
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}
