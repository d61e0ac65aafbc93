use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::submission::models::{
    ExperiencePolicy, SubmissionFields, MAX_DOCUMENT_BYTES, MAX_EXPERIENCE_YEARS,
};

/// Form fields that can carry a validation error, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "apiKey")]
    Credential,
    #[serde(rename = "file")]
    Document,
    #[serde(rename = "jobTitle")]
    JobTitle,
    #[serde(rename = "experience")]
    Experience,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Credential => "apiKey",
            Field::Document => "file",
            Field::JobTitle => "jobTitle",
            Field::Experience => "experience",
        }
    }
}

/// Field → message. Empty means the submission may be transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

#[cfg(test)]
impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {msg}", field.as_str()))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validates a submission. Pure; the caller must not transmit unless the result is empty.
pub fn validate(fields: &SubmissionFields, policy: ExperiencePolicy) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if fields.credential.is_blank() {
        errors.insert(Field::Credential, "API key is required");
    } else if !fields.credential_validated {
        errors.insert(Field::Credential, "Please validate your API key first");
    }

    match &fields.document {
        None => errors.insert(Field::Document, "Please upload your resume"),
        Some(doc) if !doc.is_pdf() => errors.insert(Field::Document, "Only PDF files are supported"),
        Some(doc) if doc.size() > MAX_DOCUMENT_BYTES => {
            errors.insert(Field::Document, "Resume must be 10MB or smaller")
        }
        Some(_) => {}
    }

    if fields.job_title.trim().is_empty() {
        errors.insert(Field::JobTitle, "Job title is required");
    }

    if fields.experience_years > MAX_EXPERIENCE_YEARS {
        errors.insert(Field::Experience, "Experience must be between 0 and 25 years");
    } else if fields.experience_years == 0 && policy == ExperiencePolicy::RequireExperience {
        errors.insert(Field::Experience, "Please select your years of experience");
    }

    errors
}
