use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error("subscription not found")]
    NotFound,
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl SubscriptionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SubscriptionError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Storage detail stays in the logs.
        let message = match &self {
            SubscriptionError::Storage(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SubscriptionError::validation("price must be a positive integer").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(SubscriptionError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            SubscriptionError::Storage(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_storage_error_body_is_generic() {
        let response = SubscriptionError::Storage(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "internal error");
    }
}
