use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    errors::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
    users::dto::{CreateUserRequest, UserPatch, UserResponse},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        // DELETE takes an email in the segment the other methods use for the id.
        .route(
            "/user/:id",
            get(get_user_by_id)
                .put(update_user)
                .delete(delete_user_by_email),
        )
        .route("/user/email/:email", get(get_user_by_email))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<StatusCode, AppError> {
    let email = payload.email.as_deref().unwrap_or_default();
    let name = payload.name.as_deref().unwrap_or_default();
    state.identity.create(email, name).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.identity.get_by_id(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    AppPath(email): AppPath<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.identity.get_by_email(&email).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<UserPatch>,
) -> Result<StatusCode, AppError> {
    state.identity.update_name_and_email(id, patch).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn delete_user_by_email(
    State(state): State<AppState>,
    AppPath(email): AppPath<String>,
) -> Result<StatusCode, AppError> {
    state.identity.delete_by_email(&email).await?;
    Ok(StatusCode::OK)
}
