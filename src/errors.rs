use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

/// Stable error codes. Clients match on these, never on the message.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Column protected by a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Login,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::Login => "login",
        }
    }
}

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} already registered", .0.as_str())]
    Conflict(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Service-level error. Every variant maps to a stable code and status.
#[derive(Debug, Error)]
pub enum AppError {
    /// HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Missing or malformed input. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch. The message never says which part was wrong.
    #[error("invalid credentials")]
    Authentication,

    /// Anything unrelated to business rules. HTTP 500, cause stays server-side.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => error_code::NOT_FOUND,
            AppError::Conflict(_) => error_code::ALREADY_EXISTS,
            AppError::Validation(_) => error_code::VALIDATION_FAILED,
            AppError::Authentication => error_code::UNAUTHENTICATED,
            AppError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the usual JSON body under a route-specific status.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => AppError::Conflict(e.to_string()),
            StoreError::NotFound => AppError::NotFound(e.to_string()),
            StoreError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "request body rejected");
        let msg = match rejection {
            JsonRejection::JsonDataError(_) => "request body has missing or invalid fields",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "expected request with `Content-Type: application/json`",
            _ => "unreadable request body",
        };
        AppError::Validation(msg.into())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "path rejected");
        AppError::Validation("invalid path parameter".into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "query rejected");
        AppError::Validation("invalid query string".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.into_response_with_status(status)
    }
}
