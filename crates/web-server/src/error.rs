use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Validation error: {0}")]
    Validation(#[from] core_types::CoreError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Turns a repository `NotFound` into a 404 carrying `message`; other errors pass through.
    pub fn not_found_as(message: &str) -> impl FnOnce(database::DbError) -> AppError + '_ {
        move |err| match err {
            database::DbError::NotFound => AppError::NotFound(message.to_string()),
            other => AppError::Database(other),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Validation(core_types::CoreError::InvalidInput(field, reason)) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid {field}: {reason}"),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
