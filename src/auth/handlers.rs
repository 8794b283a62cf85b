use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthUser,
    },
    errors::AppError,
    extract::AppJson,
    state::AppState,
    users::dto::UserResponse,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

/// Login conflicts are answered with 400 on this route.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Response {
    match state.auth.register(payload).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e @ AppError::Conflict(_)) => e.into_response_with_status(StatusCode::BAD_REQUEST),
        Err(e) => e.into_response(),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = state.auth.login(payload).await?;
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.identity.get_by_id(identity.user_id).await.map_err(|e| match e {
        AppError::NotFound(_) => AppError::Authentication,
        other => other,
    })?;
    Ok(Json(user.into()))
}
