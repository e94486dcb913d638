use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::distance::DistanceError;
use crate::store::StoreError;

/// Caller-facing error kinds. The display text of every variant except
/// `Internal` is part of the HTTP contract and must not change.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("the order request is invalid")]
    InvalidRequest,

    #[error("the query strings provided are invalid")]
    InvalidQuery,

    #[error("the distance between origin and destination is unknown")]
    DistanceUnknown,

    #[error("the order requested does not exist")]
    NotFound,

    #[error("the order is already taken")]
    AlreadyTaken,

    #[error("internal error: {0}")]
    Internal(String),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "the request failed by internal error";

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(format!("order store: {err}"))
    }
}

impl From<DistanceError> for AppError {
    fn from(err: DistanceError) -> Self {
        match err {
            DistanceError::Unknown => AppError::DistanceUnknown,
            other => AppError::Internal(format!("distance provider: {other}")),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest | AppError::InvalidQuery | AppError::DistanceUnknown => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyTaken => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::{AppError, INTERNAL_ERROR_MESSAGE};
    use crate::distance::DistanceError;

    #[test]
    fn unknown_distance_is_a_caller_error() {
        let err = AppError::from(DistanceError::Unknown);
        assert!(matches!(err, AppError::DistanceUnknown));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failure_is_internal() {
        let err = AppError::from(DistanceError::Upstream("timeout".to_string()));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let response = AppError::Internal("password=hunter2".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn conflict_and_not_found_codes() {
        assert_eq!(AppError::AlreadyTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
