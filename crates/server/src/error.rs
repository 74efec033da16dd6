use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorBody;

use crate::db::query::QueryError;
use crate::openai::OpenAiError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    AuthError(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Timeout(String),

    /// Upstream failure whose message is safe to show the caller
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Upstream(_)
            | AppError::Internal(_)
            | AppError::Database(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message rendered to the client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Database(_) | AppError::Other(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<OpenAiError> for AppError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Status { status, .. } if status == 401 => {
                AppError::ServiceUnavailable("AI service authentication failed".to_string())
            }
            OpenAiError::Status { status, .. } if status == 429 => AppError::RateLimited(
                "AI service rate limit exceeded, please try again later".to_string(),
            ),
            OpenAiError::Status { status, .. } if status >= 500 => {
                AppError::ServiceUnavailable("AI service temporarily unavailable".to_string())
            }
            OpenAiError::Timeout => {
                AppError::Timeout("Request timeout, please try again".to_string())
            }
            OpenAiError::EmptyResponse => {
                AppError::Upstream("No response generated by AI service".to_string())
            }
            other => {
                tracing::error!("AI service call failed: {}", other);
                AppError::Upstream("Failed to generate response".to_string())
            }
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownTable(_) => AppError::NotFound(err.to_string()),
            QueryError::ReadOnly(_) => AppError::Forbidden(err.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> OpenAiError {
        OpenAiError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_upstream_auth_failure_maps_to_503() {
        let err = AppError::from(status_error(401));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.public_message(), "AI service authentication failed");
    }

    #[test]
    fn test_upstream_rate_limit_keeps_429() {
        let err = AppError::from(status_error(429));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_upstream_server_error_maps_to_503() {
        let err = AppError::from(status_error(502));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.public_message(), "AI service temporarily unavailable");
    }

    #[test]
    fn test_upstream_other_status_maps_to_500() {
        let err = AppError::from(status_error(400));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to generate response");
    }

    #[test]
    fn test_timeout_maps_to_408() {
        let err = AppError::from(OpenAiError::Timeout);
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.public_message(), "Request timeout, please try again");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_query_errors_are_client_errors() {
        let err = AppError::from(QueryError::UnknownTable("users".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(QueryError::MissingCondition("delete"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No condition provided for delete");

        let err = AppError::from(QueryError::ReadOnly("coaches".to_string()));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
