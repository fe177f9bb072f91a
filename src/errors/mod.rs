//! Error handling module for the employee registration wizard.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;
use crate::workflow::MAX_EMPLOYEES;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BUSINESS_RULE: &str = "BUSINESS_RULE";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Business-rule violations, shown to the user as a dismissible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessRule {
    DuplicateEmployeeEmail,
    EmployeeLimitReached,
    NoEmployees,
    OwnerAlreadyRegistered,
    NoSession,
    ActionUnavailable,
}

impl BusinessRule {
    pub fn message(&self) -> String {
        match self {
            BusinessRule::DuplicateEmployeeEmail => {
                "An employee with this email already exists".to_string()
            }
            BusinessRule::EmployeeLimitReached => {
                format!("Maximum of {} employees reached", MAX_EMPLOYEES)
            }
            BusinessRule::NoEmployees => "Please add at least one employee".to_string(),
            BusinessRule::OwnerAlreadyRegistered => {
                "A business owner with this email is already registered".to_string()
            }
            BusinessRule::NoSession => "No active session, please log in".to_string(),
            BusinessRule::ActionUnavailable => {
                "This action is not available on the current screen".to_string()
            }
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Field-level validation failures
    Validation(ValidationErrors),
    /// Duplicate, limit, empty-submission or out-of-place actions
    BusinessRule(BusinessRule),
    /// Resource not found
    NotFound(String),
    /// Durable local storage failure
    Storage(String),
    /// Remote mirror failure
    Remote(String),
    /// Invalid configuration
    Config(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Remote(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BusinessRule(_) => codes::BUSINESS_RULE,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Remote(_) => codes::REMOTE_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(errors) => errors.to_string(),
            AppError::BusinessRule(rule) => rule.message(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Remote(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// The business rule that was violated, if any.
    pub fn business_rule(&self) -> Option<BusinessRule> {
        match self {
            AppError::BusinessRule(rule) => Some(*rule),
            _ => None,
        }
    }

    /// Field errors, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<BusinessRule> for AppError {
    fn from(rule: BusinessRule) -> Self {
        AppError::BusinessRule(rule)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Storage(format!("Database error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("File error: {:?}", err);
        AppError::Storage(format!("File error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remote(format!("Mirror request failed: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::Validation(errors) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .iter()
                    .map(|e| (e.field.to_string(), serde_json::Value::String(e.message.clone())))
                    .collect();
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
