use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::submission::ExperiencePolicy;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub output_dir: PathBuf,
    pub experience_policy: ExperiencePolicy,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("ATS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("ATS_API_URL must be an http(s) URL, got '{api_url}'");
        }

        let experience_policy = match lookup("ATS_EXPERIENCE_POLICY") {
            Some(raw) => raw
                .parse::<ExperiencePolicy>()
                .map_err(anyhow::Error::msg)
                .context("ATS_EXPERIENCE_POLICY is invalid")?,
            None => ExperiencePolicy::default(),
        };

        Ok(Config {
            api_url,
            output_dir: lookup("ATS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            experience_policy,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
