use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::util::{extract::ExtractError, wikipedia::WikipediaError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest".to_string(), msg),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal".to_string(),
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            error: ErrorDetail { code, message },
        });

        (status, body).into_response()
    }
}

impl From<WikipediaError> for AppError {
    fn from(err: WikipediaError) -> Self {
        match err {
            WikipediaError::InvalidLanguage(_) => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported(_) | ExtractError::Empty => {
                AppError::BadRequest(err.to_string())
            }
            ExtractError::Other(inner) => AppError::Internal(inner),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
