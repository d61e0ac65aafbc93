use thiserror::Error;

use crate::api_client::AnalysisFailure;
use crate::notify::Notification;
use crate::report::ExportError;
use crate::submission::ValidationErrors;

/// Application-level error type.
/// Every variant maps to a user-facing `Notification` via [`AppError::notification`];
/// internal detail is logged, never shown.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Credential encoding failed: {0}")]
    Encoding(String),

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Converts the error into the notification the user sees.
    pub fn notification(&self) -> Notification {
        match self {
            AppError::Encoding(msg) => {
                tracing::error!("Credential encoding error: {msg}");
                Notification::error("Error", "Failed to analyze resume. Please try again.")
            }
            AppError::Validation(errors) => {
                tracing::debug!("Submission rejected: {errors}");
                Notification::error(
                    "Please fill in all required fields",
                    "Make sure to provide all required information and validate your API key",
                )
            }
            AppError::Analysis(failure) => {
                tracing::error!("Analysis request failed: {}", failure.detail());
                Notification::error("Error", "Failed to analyze resume. Please try again.")
            }
            AppError::Export(ExportError::RegionNotFound(region)) => {
                tracing::error!("Export region '{region}' is not rendered");
                Notification::error("Error", "Unable to generate PDF. Please try again.")
            }
            AppError::Export(e) => {
                tracing::error!("PDF generation failed: {e}");
                Notification::error("Error", "Failed to generate PDF. Please try again.")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                Notification::error("Error", "An unexpected error occurred. Please try again.")
            }
        }
    }
}
