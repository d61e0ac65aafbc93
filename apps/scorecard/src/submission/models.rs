use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::credential::Credential;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// Upload limit of the resume picker ("PDF format only, up to 10MB").
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
/// Upper bound of the experience slider.
pub const MAX_EXPERIENCE_YEARS: u8 = 25;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The uploaded resume file.
#[derive(Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeDocument {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a resume from disk. The content type is inferred from the extension.
    /// Files over the upload limit are rejected before they are read.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read resume: {}", path.display()))?;
        if metadata.len() > MAX_DOCUMENT_BYTES as u64 {
            anyhow::bail!(
                "Resume must be 10MB or smaller: {} is {} bytes",
                path.display(),
                metadata.len()
            );
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read resume: {}", path.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();

        let content_type = if has_pdf_extension(&file_name) {
            PDF_CONTENT_TYPE
        } else {
            "application/octet-stream"
        };

        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// True when the file is declared as a PDF (by name or type) and carries the PDF magic.
    pub fn is_pdf(&self) -> bool {
        let declared = has_pdf_extension(&self.file_name)
            || self.content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE);
        declared && self.bytes.starts_with(PDF_MAGIC)
    }
}

fn has_pdf_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf")
}

impl fmt::Debug for ResumeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeDocument")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

impl Serialize for ResumeDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResumeDocument", 3)?;
        state.serialize_field("fileName", &self.file_name)?;
        state.serialize_field("contentType", &self.content_type)?;
        state.serialize_field("size", &self.size())?;
        state.end()
    }
}

/// Everything the analysis form collects. Handed downstream as a snapshot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFields {
    pub document: Option<ResumeDocument>,
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
    pub experience_years: u8,
    #[serde(skip)]
    pub credential: Credential,
    pub credential_validated: bool,
}

/// How a zero on the experience slider is treated.
///
/// Two variants of the product disagree; the policy is chosen explicitly in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperiencePolicy {
    /// Zero years is a valid "Fresher" submission.
    #[default]
    AcceptFresher,
    /// The user must move the slider off zero.
    RequireExperience,
}

impl FromStr for ExperiencePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fresher" | "accept-fresher" => Ok(ExperiencePolicy::AcceptFresher),
            "require-experience" => Ok(ExperiencePolicy::RequireExperience),
            other => Err(format!(
                "unknown experience policy '{other}' (expected 'fresher' or 'require-experience')"
            )),
        }
    }
}

/// Slider label for a number of years.
pub fn experience_label(years: u8) -> String {
    match years {
        0 => "Fresher".to_string(),
        1 => "1 Year".to_string(),
        n => format!("{n} Years"),
    }
}
