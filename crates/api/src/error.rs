use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lobianco_core::auth::AuthError;
use lobianco_core::storage::StorageError;
use lobianco_core::ServiceError;
use serde_json::json;

/// API error type rendered as `{"error":{"type","message","statusCode"}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::BadRequest(e.to_string()),
            ServiceError::Unauthorized => ApiError::Unauthorized("Authentication required".into()),
            ServiceError::Forbidden => ApiError::Forbidden("Admin role required".into()),
            ServiceError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            ServiceError::StoreUnavailable => {
                ApiError::Unavailable("Content store is unavailable".into())
            }
            ServiceError::Auth(AuthError::InvalidCredentials) => {
                ApiError::Unauthorized("Invalid password".into())
            }
            ServiceError::Auth(AuthError::InvalidToken(_)) => {
                ApiError::Unauthorized("Invalid session".into())
            }
            ServiceError::Auth(AuthError::PasswordLoginDisabled) => {
                ApiError::Unavailable("Password login is not configured".into())
            }
            ServiceError::Storage(StorageError::NotConfigured) => {
                ApiError::Internal("upload failed: storage is not configured".into())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Unavailable(msg) => {
                tracing::warn!("Unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lobianco_core::content::ValidationError;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation(ValidationError::Empty("titulo")), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::NotFound("property 9".into()), StatusCode::NOT_FOUND),
            (ServiceError::StoreUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::Auth(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::Storage(StorageError::Provider {
                    status: 500,
                    message: "boom".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let response = ApiError::Internal("db password leaked".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["type"], "internalError");
        assert_eq!(value["error"]["message"], "An internal error occurred");
        assert_eq!(value["error"]["statusCode"], 500);
    }
}
