//! Typed errors, the wire error vocabulary, and HTTP mapping.

use crate::messages;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    ApiError,
    InvalidRequestError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParameterMissing,
    ParameterInvalid,
    StringLengthExceeded,
    StringLengthNotMet,
}

/// One client-facing error. Built per request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl ApiError {
    pub fn invalid_request(message: String) -> Self {
        ApiError {
            code: None,
            message,
            kind: ErrorType::InvalidRequestError,
            param: None,
        }
    }

    pub fn invalid_param(code: ErrorCode, message: String, param: Option<String>) -> Self {
        ApiError {
            code: Some(code),
            message,
            kind: ErrorType::InvalidRequestError,
            param,
        }
    }

    fn api_error() -> Self {
        ApiError {
            code: None,
            message: messages::api_error(),
            kind: ErrorType::ApiError,
            param: None,
        }
    }
}

/// Every violation found for one request, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<ApiError>,
}

impl ErrorList {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ApiError,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(ErrorList),
    #[error("no such {resource}: '{id}'")]
    NotFound { resource: &'static str, id: Uuid },
    #[error("invalid request: {}", .0.message)]
    InvalidRequest(ApiError),
    #[error("unknown route: {}", .0.message)]
    UnknownRoute(ApiError),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        AppError::NotFound { resource, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } | AppError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Db(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Validation(list) => return (status, Json(list)).into_response(),
            AppError::NotFound { resource, id } => ApiError {
                code: None,
                message: messages::not_found(resource, id),
                kind: ErrorType::InvalidRequestError,
                param: Some("id".to_string()),
            },
            AppError::InvalidRequest(e) | AppError::UnknownRoute(e) => e,
            AppError::Unauthenticated(message) => ApiError::invalid_request(message),
            other => {
                tracing::error!(error = %other, status = status.as_u16(), "request failed");
                ApiError::api_error()
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
