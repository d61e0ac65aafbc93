//! The only module that talks to the ATS analysis backend.
//!
//! Two calls: credential verification (fail-closed, always a `bool`) and resume
//! submission (single attempt, no retry, no client-side timeout).

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::RawAnalysisResponse;
use crate::credential::{self, ObfuscatedToken};
use crate::errors::AppError;
use crate::submission::{SubmissionFields, PDF_CONTENT_TYPE};

const VALIDATE_PATH: &str = "/validate-api-key";
const ANALYZE_PATH: &str = "/analyze-resume";

/// Any transport failure, non-success status, or unreadable body.
/// Display is the user-facing message; `detail` is for logs only.
#[derive(Debug, Error)]
#[error("Failed to analyze resume. Please try again.")]
pub struct AnalysisFailure {
    detail: String,
}

impl AnalysisFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<reqwest::Error> for AnalysisFailure {
    fn from(e: reqwest::Error) -> Self {
        AnalysisFailure::new(format!("transport error: {e}"))
    }
}

/// Stateless HTTP client for the analysis backend.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Asks the backend whether the credential behind `token` is usable.
    /// Only an exact boolean `true` in `valid` counts; every failure is `false`.
    pub async fn validate_credential(&self, token: &ObfuscatedToken) -> bool {
        match self.try_validate(token).await {
            Ok(valid) => {
                info!(valid, "Credential verification finished");
                valid
            }
            Err(e) => {
                warn!("Credential verification failed, treating as invalid: {}", e.detail());
                false
            }
        }
    }

    async fn try_validate(&self, token: &ObfuscatedToken) -> Result<bool, AnalysisFailure> {
        let response = self
            .client
            .post(self.url(VALIDATE_PATH))
            .query(&[("api_key", token.as_str())])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisFailure::new(format!(
                "verification endpoint returned status {status}"
            )));
        }

        let body: Value = response.json().await?;
        Ok(matches!(body.get("valid"), Some(Value::Bool(true))))
    }

    /// Submits a validated snapshot for analysis.
    ///
    /// The caller must have run the form validator first. Obfuscation happens
    /// before any I/O; if it fails, nothing is sent.
    pub async fn submit(&self, fields: &SubmissionFields) -> Result<RawAnalysisResponse, AppError> {
        let token = credential::obfuscate(&fields.credential)?;
        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("submission", %submission_id);

        self.send_analysis(fields, token)
            .instrument(span)
            .await
            .map_err(AppError::from)
    }

    async fn send_analysis(
        &self,
        fields: &SubmissionFields,
        token: ObfuscatedToken,
    ) -> Result<RawAnalysisResponse, AnalysisFailure> {
        let document = fields
            .document
            .as_ref()
            .ok_or_else(|| AnalysisFailure::new("submission has no document"))?;

        debug!(
            file_name = %document.file_name,
            size = document.size(),
            "Building multipart analysis request"
        );

        let file = Part::bytes(document.bytes.to_vec())
            .file_name(document.file_name.clone())
            .mime_str(PDF_CONTENT_TYPE)?;

        let form = Form::new()
            .part("file", file)
            .text("job_description", fields.job_description.clone())
            .text("job_title", fields.job_title.clone())
            .text("company", fields.company_name.clone())
            .text("api_key", token.as_str().to_string())
            .text("experience", fields.experience_years.to_string());

        info!("Submitting resume for analysis");
        let response = self
            .client
            .post(self.url(ANALYZE_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisFailure::new(format!(
                "analysis endpoint returned status {status}: {body}"
            )));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Analysis response received");

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(mut envelope)) => {
                let inner = envelope.remove("response").unwrap_or(Value::Null);
                Ok(RawAnalysisResponse::from(inner))
            }
            Ok(_) => Err(AnalysisFailure::new("response body is not a JSON object")),
            Err(e) => Err(AnalysisFailure::new(format!("response body is not JSON: {e}"))),
        }
    }
}
