//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use wishwall_core::{StoreError, ValidationError, WallError};
use wishwall_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation errors: {0:?}")]
    Validation(Vec<String>),

    /// The store failed; the request itself was fine.
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Map a failed form submission, preferring the form's inline message
    /// as the problem detail.
    pub fn from_form(err: WallError, message: Option<&str>) -> Self {
        let Some(message) = message else {
            return err.into();
        };
        match err {
            WallError::Validation(_) => AppError::Validation(vec![message.to_string()]),
            WallError::Store(StoreError::NotFound { table, id }) => {
                AppError::NotFound(format!("{table} row {id} not found"))
            }
            WallError::Store(_) => AppError::Store(message.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Validation(errors) => ErrorResponse::validation_failed(errors.join(", ")),
            AppError::Store(detail) => {
                tracing::error!("Store error: {}", detail);
                ErrorResponse::bad_gateway(detail)
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(vec![err.to_string()])
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => {
                AppError::NotFound(format!("{table} row {id} not found"))
            }
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<WallError> for AppError {
    fn from(err: WallError) -> Self {
        match err {
            WallError::Validation(e) => e.into(),
            WallError::Store(e) => e.into(),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn form_message_becomes_detail() {
        let err = AppError::from_form(
            ValidationError::EmptyContent.into(),
            Some("Please enter your wish"),
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(err, AppError::Validation(ref m) if m == &["Please enter your wish"]));
    }

    #[test]
    fn store_errors_map_to_gateway_or_not_found() {
        let offline = AppError::from(StoreError::Unavailable("offline".into()));
        assert_eq!(offline.status_code(), StatusCode::BAD_GATEWAY);

        let missing = AppError::from(StoreError::NotFound {
            table: "posts",
            id: Uuid::nil(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
