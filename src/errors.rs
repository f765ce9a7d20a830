use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every variant is reported to the caller the same way: a 500 response whose
/// `error` field carries the textual description. The variants only exist so
/// the logs can tell the failure sources apart.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The request body is missing a field, has a non-numeric value, or
    /// breaks an invariant of the observation record.
    Validation(String),
    /// The scaler or classifier rejected the feature vector.
    Model(String),
    /// Unexpected internal fault (e.g. a class the stage table does not know).
    Internal(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Model(msg) => write!(f, "Model error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// All failures map to 500 with `{"error": <description>}`. Logging
    /// severity still follows the failure source.
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => {
                tracing::warn!("Rejected prediction request: {}", msg);
            }
            AppError::Model(msg) => {
                tracing::error!("Model error: {}", msg);
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
            }
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    /// Body parsing failures are validation failures (missing field,
    /// non-numeric value, malformed JSON).
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain_display() {
        let err: Result<(), AppError> = Err(AppError::Model("scaler failed".to_string()));
        let err = err.context("Prediction failed").unwrap_err();
        assert_eq!(err.to_string(), "Prediction failed: Model error: scaler failed");
    }

    #[test]
    fn test_every_variant_maps_to_500() {
        let errors = vec![
            AppError::Validation("missing field `Age`".to_string()),
            AppError::Model("bad vector".to_string()),
            AppError::Internal("unknown class 7".to_string()),
        ];
        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_serde_errors_become_validation() {
        let parsed: Result<f64, serde_json::Error> = serde_json::from_str("\"abc\"");
        let err: AppError = parsed.unwrap_err().into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
