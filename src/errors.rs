use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("window {window} is not available")]
    Conflict { window: String },

    #[error("session is fully booked")]
    CapacityExceeded,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(e) => {
                // Store failures always surface as 500s, never as a
                // silently unchecked write.
                tracing::error!(error = %e, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::CapacityExceeded => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = match &self {
            // Conflict responses carry the window that blocked admission.
            AppError::Conflict { window } => serde_json::json!({
                "error": self.to_string(),
                "conflicting_window": window,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
