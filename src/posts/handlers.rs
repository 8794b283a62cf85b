use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    errors::AppError,
    extract::{AppJson, AppPath, AppQuery},
    posts::{
        dto::{CreatePostRequest, DeletePostQuery},
        repo_types::Post,
    },
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_post).delete(delete_post))
        .route("/post/hub", get(list_posts))
        .route("/post/:id", get(get_post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<StatusCode, AppError> {
    state
        .posts
        .create(payload.content.as_deref().unwrap_or_default())
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Post>, AppError> {
    Ok(Json(state.posts.get_by_id(id).await?))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.posts.list().await?))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<DeletePostQuery>,
) -> Result<StatusCode, AppError> {
    state.posts.delete_by_id(q.id).await?;
    Ok(StatusCode::OK)
}
