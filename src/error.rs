use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const NO_TODO_WITH_ID: &str = "No todo found with given ID";

/// Failure of a single request. Each variant maps to one status code and is
/// rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Storage(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "storage query failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

/// Errors that stop the process before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("server error: {0}")]
    Server(#[from] hyper::Error),
}
