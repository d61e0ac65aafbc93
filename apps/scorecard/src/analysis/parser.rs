//! Turns whatever the provider returned into a `NormalizedAnalysis`.
//!
//! Parsing never fails. A payload that cannot be decoded yields the all-default
//! analysis tagged `Degraded`, so a bad provider reply shows as "no data" and the
//! reason still reaches the log.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::models::{CriteriaRatings, Criterion, NormalizedAnalysis, RawAnalysisResponse};

const FENCE: &str = "```";
const FENCE_LANG: &str = "json";

/// Result of parsing a raw response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(NormalizedAnalysis),
    Degraded {
        analysis: NormalizedAnalysis,
        reason: String,
    },
}

impl ParseOutcome {
    pub fn into_analysis(self) -> NormalizedAnalysis {
        match self {
            ParseOutcome::Parsed(analysis) | ParseOutcome::Degraded { analysis, .. } => analysis,
        }
    }
}

/// Parses a raw analysis response.
pub fn parse(raw: &RawAnalysisResponse) -> ParseOutcome {
    let value = match raw {
        RawAnalysisResponse::Text(text) | RawAnalysisResponse::Structured(Value::String(text)) => {
            let cleaned = strip_fences(text);
            match serde_json::from_str::<Value>(cleaned) {
                Ok(value) => value,
                Err(e) => return degraded(format!("payload is not valid JSON: {e}")),
            }
        }
        RawAnalysisResponse::Structured(value) => value.clone(),
    };

    match value {
        Value::Object(map) => ParseOutcome::Parsed(normalize(&map)),
        other => degraded(format!("payload is a JSON {}, not an object", type_name(&other))),
    }
}

fn degraded(reason: String) -> ParseOutcome {
    warn!("Analysis payload degraded to defaults: {reason}");
    ParseOutcome::Degraded {
        analysis: NormalizedAnalysis::default(),
        reason,
    }
}

/// Strips leading/trailing code fences (```` ``` ```` or ```` ```json ````, any case,
/// any number of times) and surrounding whitespace.
pub fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    loop {
        let before = text.len();
        if let Some(rest) = text.strip_prefix(FENCE) {
            text = strip_lang_tag(rest).trim_start();
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim_end();
        }
        if text.len() == before {
            return text;
        }
    }
}

fn strip_lang_tag(text: &str) -> &str {
    match text.get(..FENCE_LANG.len()) {
        Some(tag) if tag.eq_ignore_ascii_case(FENCE_LANG) => &text[FENCE_LANG.len()..],
        _ => text,
    }
}

fn normalize(map: &Map<String, Value>) -> NormalizedAnalysis {
    let ratings = map.get("ats_criteria_ratings").and_then(Value::as_object);
    if ratings.is_none() {
        debug!("Payload has no ats_criteria_ratings object; criteria default to 0");
    }

    let mut criteria = CriteriaRatings::default();
    for criterion in Criterion::ALL {
        let rating = ratings
            .and_then(|r| r.get(criterion.payload_key()))
            .map(number_or_zero)
            .unwrap_or(0.0);
        criteria.set(criterion, rating);
    }

    NormalizedAnalysis {
        overall_score: map.get("overall_score").map(number_or_zero).unwrap_or(0.0),
        summary: read_summary(map.get("feedback_summary")),
        strengths: read_strings(map.get("pros")),
        weaknesses: read_strings(map.get("cons")),
        criteria,
        confidence: map.get("confidence_score").and_then(read_number),
    }
}

/// A JSON number, or a string holding one (`"8"`, `" 7.5 "`).
fn read_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn number_or_zero(value: &Value) -> f64 {
    read_number(value).unwrap_or(0.0)
}

/// `feedback_summary` may be a single string or a list of lines joined by spaces.
fn read_summary(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn read_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
