use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `response` field of the analysis endpoint, as received.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnalysisResponse {
    /// JSON text, possibly wrapped in code fences.
    Text(String),
    /// An already-decoded JSON value.
    Structured(Value),
}

impl From<Value> for RawAnalysisResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RawAnalysisResponse::Text(text),
            other => RawAnalysisResponse::Structured(other),
        }
    }
}

impl RawAnalysisResponse {
    /// Interprets a saved response file: either the endpoint envelope
    /// (`{"response": ...}`) or the bare payload text.
    pub fn from_saved(contents: String) -> Self {
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(mut map)) if map.contains_key("response") => {
                RawAnalysisResponse::from(map.remove("response").unwrap_or(Value::Null))
            }
            _ => RawAnalysisResponse::Text(contents),
        }
    }
}

/// The six ATS criteria, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    SkillMatch,
    KeywordMatch,
    ExperienceRelevance,
    Formatting,
    ActionVerbUsage,
    JobFit,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::SkillMatch,
        Criterion::KeywordMatch,
        Criterion::ExperienceRelevance,
        Criterion::Formatting,
        Criterion::ActionVerbUsage,
        Criterion::JobFit,
    ];

    /// Key inside `ats_criteria_ratings`.
    pub fn payload_key(&self) -> &'static str {
        match self {
            Criterion::SkillMatch => "skill_match_score",
            Criterion::KeywordMatch => "keyword_match_score",
            Criterion::ExperienceRelevance => "experience_relevance_score",
            Criterion::Formatting => "resume_formatting_score",
            Criterion::ActionVerbUsage => "action_verb_usage_score",
            Criterion::JobFit => "job_fit_score",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Criterion::SkillMatch => "Skill Match Score",
            Criterion::KeywordMatch => "Keyword Match Score",
            Criterion::ExperienceRelevance => "Experience Relevance Score",
            Criterion::Formatting => "Resume Formatting Score",
            Criterion::ActionVerbUsage => "Action Verbs Usage Score",
            Criterion::JobFit => "Job Fit Prediction Score",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Criterion::SkillMatch => "How well your skills align with the job requirements",
            Criterion::KeywordMatch => "Relevance of keywords used in your resume",
            Criterion::ExperienceRelevance => "Alignment of your experience with the target role",
            Criterion::Formatting => "Professional presentation and structure of your resume",
            Criterion::ActionVerbUsage => "Effectiveness of action verbs in describing achievements",
            Criterion::JobFit => "Overall prediction of your fit for the position",
        }
    }
}

/// Provider ratings (nominally 0–10) for each criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaRatings {
    pub skill_match: f64,
    pub keyword_match: f64,
    pub experience_relevance: f64,
    pub formatting: f64,
    pub action_verb_usage: f64,
    pub job_fit: f64,
}

impl CriteriaRatings {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::SkillMatch => self.skill_match,
            Criterion::KeywordMatch => self.keyword_match,
            Criterion::ExperienceRelevance => self.experience_relevance,
            Criterion::Formatting => self.formatting,
            Criterion::ActionVerbUsage => self.action_verb_usage,
            Criterion::JobFit => self.job_fit,
        }
    }

    pub fn set(&mut self, criterion: Criterion, rating: f64) {
        let slot = match criterion {
            Criterion::SkillMatch => &mut self.skill_match,
            Criterion::KeywordMatch => &mut self.keyword_match,
            Criterion::ExperienceRelevance => &mut self.experience_relevance,
            Criterion::Formatting => &mut self.formatting,
            Criterion::ActionVerbUsage => &mut self.action_verb_usage,
            Criterion::JobFit => &mut self.job_fit,
        };
        *slot = rating;
    }
}

/// Analysis payload after normalization. Missing fields are zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedAnalysis {
    pub overall_score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub criteria: CriteriaRatings,
    /// Provider's confidence in its own assessment (0–100), when reported.
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_value_becomes_text() {
        let raw = RawAnalysisResponse::from(json!("{\"overall_score\": 1}"));
        assert!(matches!(raw, RawAnalysisResponse::Text(_)));
    }

    #[test]
    fn test_object_value_stays_structured() {
        let raw = RawAnalysisResponse::from(json!({"overall_score": 1}));
        assert!(matches!(raw, RawAnalysisResponse::Structured(_)));
    }

    #[test]
    fn test_from_saved_unwraps_envelope() {
        let saved = r#"{"response": "```json\n{}\n```"}"#.to_string();
        assert_eq!(
            RawAnalysisResponse::from_saved(saved),
            RawAnalysisResponse::Text("```json\n{}\n```".to_string())
        );
    }

    #[test]
    fn test_from_saved_keeps_bare_payload() {
        let saved = r#"{"overall_score": 64}"#.to_string();
        assert_eq!(
            RawAnalysisResponse::from_saved(saved.clone()),
            RawAnalysisResponse::Text(saved)
        );
    }

    #[test]
    fn test_criteria_get_set_cover_every_criterion() {
        let mut ratings = CriteriaRatings::default();
        for (i, c) in Criterion::ALL.iter().enumerate() {
            ratings.set(*c, i as f64);
        }
        for (i, c) in Criterion::ALL.iter().enumerate() {
            assert_eq!(ratings.get(*c), i as f64);
        }
    }

    #[test]
    fn test_payload_keys_are_unique() {
        let mut keys: Vec<_> = Criterion::ALL.iter().map(|c| c.payload_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }
}
