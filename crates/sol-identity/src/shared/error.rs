//! Identity Gateway Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Token acquisition against the provider's token endpoint failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The Management API rejected a call. `operation` names the remote
    /// call so a partial-workflow failure is attributable to its step.
    #[error("Management API call '{operation}' failed ({status:?}): {message}")]
    Management {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// A multi-step workflow failed after partial progress. The source is
    /// the original step error; compensation outcomes are logged only.
    #[error("{context}: {source}")]
    Workflow {
        context: String,
        #[source]
        source: Box<IdentityError>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IdentityError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn management(
        operation: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Management {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    pub fn workflow(context: impl Into<String>, source: IdentityError) -> Self {
        Self::Workflow {
            context: context.into(),
            source: Box::new(source),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::BAD_GATEWAY,
            Self::Management { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
            // A workflow failure surfaces the status of its original cause
            Self::Workflow { source, .. } => source.status_code(),
            Self::Configuration { .. } | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Auth(_) => "UPSTREAM_AUTH_ERROR",
            Self::Management { .. } | Self::Http(_) => "UPSTREAM_ERROR",
            Self::Workflow { source, .. } => source.error_type(),
            Self::Configuration { .. } | Self::Json(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::error!(error = %self, status = %status, "request failed");

        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = IdentityError::not_found("User", "auth0|123");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_type(), "NOT_FOUND");
    }

    #[test]
    fn test_management_maps_to_bad_gateway() {
        let err = IdentityError::management("create_user", Some(500), "boom");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_workflow_surfaces_source_status() {
        let source = IdentityError::not_found("Role", "rol_1");
        let err = IdentityError::workflow("user creation failed", source);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        // The message keeps the original cause visible
        assert!(err.to_string().contains("user creation failed"));
        assert!(err.to_string().contains("rol_1"));
    }
}
