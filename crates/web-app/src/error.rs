//! HTTP error handling and response types.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use robur_domain as domain;
use serde::Serialize;

/// API error response body. Validation failures carry a per-field message map.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing or unknown authenticated user
    Unauthorized,
    /// Resource missing or owned by another user; both look alike
    NotFound,
    /// Per-field validation failures
    Validation(Vec<domain::ValidationError>),
    /// Uniqueness race caught by the datastore
    Conflict,
    /// Anything else
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiError {
                    message: "Unauthenticated.".to_string(),
                    errors: None,
                },
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiError {
                    message: "Not found.".to_string(),
                    errors: None,
                },
            ),
            AppError::Validation(errors) => {
                let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for error in errors {
                    match error {
                        domain::ValidationError::Field { field, message } => {
                            fields.entry(field).or_default().push(message);
                        }
                        domain::ValidationError::Conflict(field) => {
                            fields
                                .entry(field.clone())
                                .or_default()
                                .push(format!("The {field} has already been taken."));
                        }
                    }
                }
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError {
                        message: "The given data was invalid.".to_string(),
                        errors: Some(fields),
                    },
                )
            }
            AppError::Conflict => (
                StatusCode::CONFLICT,
                ApiError {
                    message: "Conflict.".to_string(),
                    errors: None,
                },
            ),
            AppError::Internal(message) => {
                tracing::error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        message: "Internal server error.".to_string(),
                        errors: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<domain::ValidationError> for AppError {
    fn from(err: domain::ValidationError) -> Self {
        AppError::Validation(vec![err])
    }
}

impl From<domain::ReadError> for AppError {
    fn from(err: domain::ReadError) -> Self {
        match err {
            domain::ReadError::NotFound => AppError::NotFound,
            domain::ReadError::Storage(err) => AppError::Internal(err.to_string()),
            domain::ReadError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<domain::CreateError> for AppError {
    fn from(err: domain::CreateError) -> Self {
        match err {
            domain::CreateError::NotFound => AppError::NotFound,
            domain::CreateError::Conflict => AppError::Conflict,
            domain::CreateError::Validation(err) => AppError::Validation(vec![err]),
            domain::CreateError::Storage(err) => AppError::Internal(err.to_string()),
            domain::CreateError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<domain::UpdateError> for AppError {
    fn from(err: domain::UpdateError) -> Self {
        match err {
            domain::UpdateError::NotFound => AppError::NotFound,
            domain::UpdateError::Conflict => AppError::Conflict,
            domain::UpdateError::Validation(err) => AppError::Validation(vec![err]),
            domain::UpdateError::Storage(err) => AppError::Internal(err.to_string()),
            domain::UpdateError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<domain::DeleteError> for AppError {
    fn from(err: domain::DeleteError) -> Self {
        match err {
            domain::DeleteError::NotFound => AppError::NotFound,
            domain::DeleteError::Storage(err) => AppError::Internal(err.to_string()),
            domain::DeleteError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
