use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ValidationError: {0}")]
    Validation(String),
    #[error("DatabaseError: {0}")]
    Database(#[from] libsql::Error),
    #[error("CorruptRow: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        use ServiceError::*;
        match self {
            InvalidInput(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Schema validation failures become `InvalidInput`. Anything else surfaces
/// as `Internal` with the given message; the cause is logged, not returned.
pub fn from_store(msg: &str, err: StoreError) -> ServiceError {
    match err {
        StoreError::Validation(s) => ServiceError::InvalidInput(s),
        other => {
            tracing::error!(error = %crate::unpack_error(&other), "{}", msg);
            ServiceError::Internal(msg.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
