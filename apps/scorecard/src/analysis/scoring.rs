use serde::Serialize;

use crate::analysis::models::{Criterion, NormalizedAnalysis};

pub const STRONG_THRESHOLD: f64 = 80.0;
pub const MODERATE_THRESHOLD: f64 = 60.0;

/// Color band for a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= STRONG_THRESHOLD {
            ScoreTier::Strong
        } else if score >= MODERATE_THRESHOLD {
            ScoreTier::Moderate
        } else {
            ScoreTier::Weak
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ScoreTier::Strong => [0x10, 0xb9, 0x81],
            ScoreTier::Moderate => [0xf5, 0x9e, 0x0b],
            ScoreTier::Weak => [0xef, 0x44, 0x44],
        }
    }
}

/// Word shown under the overall score circle.
pub fn qualitative_label(score: f64) -> &'static str {
    if score >= STRONG_THRESHOLD {
        "EXCELLENT"
    } else if score >= 70.0 {
        "GOOD"
    } else if score >= MODERATE_THRESHOLD {
        "AVERAGE"
    } else {
        "NEEDS IMPROVEMENT"
    }
}

/// One criterion prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCategory {
    pub criterion: Criterion,
    pub name: &'static str,
    /// Rating scaled by ten. Not clamped.
    pub percentage: f64,
    pub raw_rating: f64,
    pub description: &'static str,
    pub tier: ScoreTier,
}

/// Derives the six display categories in fixed order. Pure and idempotent.
pub fn derive_score_categories(analysis: &NormalizedAnalysis) -> Vec<ScoreCategory> {
    Criterion::ALL
        .into_iter()
        .map(|criterion| {
            let raw_rating = analysis.criteria.get(criterion);
            let percentage = raw_rating * 10.0;
            ScoreCategory {
                criterion,
                name: criterion.display_name(),
                percentage,
                raw_rating,
                description: criterion.description(),
                tier: ScoreTier::for_score(percentage),
            }
        })
        .collect()
}

/// Everything the results view and the text report render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub overall_score: f64,
    pub overall_label: &'static str,
    pub overall_tier: ScoreTier,
    pub categories: Vec<ScoreCategory>,
    pub analysis: NormalizedAnalysis,
}

pub fn build_scorecard(analysis: NormalizedAnalysis) -> Scorecard {
    let overall_score = analysis.overall_score;
    Scorecard {
        overall_score,
        overall_label: qualitative_label(overall_score),
        overall_tier: ScoreTier::for_score(overall_score),
        categories: derive_score_categories(&analysis),
        analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::CriteriaRatings;

    fn analysis_with(criteria: CriteriaRatings) -> NormalizedAnalysis {
        NormalizedAnalysis {
            overall_score: 72.0,
            criteria,
            ..Default::default()
        }
    }

    #[test]
    fn test_skill_match_scaled_to_percentage() {
        let cats = derive_score_categories(&analysis_with(CriteriaRatings {
            skill_match: 8.5,
            ..Default::default()
        }));
        assert_eq!(cats[0].name, "Skill Match Score");
        assert_eq!(cats[0].percentage, 85.0);
        assert_eq!(cats[0].raw_rating, 8.5);
        assert_eq!(cats[0].tier, ScoreTier::Strong);
    }

    #[test]
    fn test_six_categories_in_fixed_order() {
        let cats = derive_score_categories(&NormalizedAnalysis::default());
        let names: Vec<_> = cats.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "Skill Match Score",
                "Keyword Match Score",
                "Experience Relevance Score",
                "Resume Formatting Score",
                "Action Verbs Usage Score",
                "Job Fit Prediction Score",
            ]
        );
        assert!(cats.iter().all(|c| c.percentage == 0.0 && c.tier == ScoreTier::Weak));
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let a = analysis_with(CriteriaRatings {
            keyword_match: 6.0,
            job_fit: 9.0,
            ..Default::default()
        });
        assert_eq!(derive_score_categories(&a), derive_score_categories(&a));
    }

    #[test]
    fn test_out_of_range_rating_not_clamped() {
        let cats = derive_score_categories(&analysis_with(CriteriaRatings {
            formatting: 12.0,
            ..Default::default()
        }));
        assert_eq!(cats[3].percentage, 120.0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ScoreTier::for_score(80.0), ScoreTier::Strong);
        assert_eq!(ScoreTier::for_score(79.9), ScoreTier::Moderate);
        assert_eq!(ScoreTier::for_score(60.0), ScoreTier::Moderate);
        assert_eq!(ScoreTier::for_score(59.9), ScoreTier::Weak);
        assert_eq!(ScoreTier::Weak.rgb(), [239, 68, 68]);
    }

    #[test]
    fn test_qualitative_labels() {
        assert_eq!(qualitative_label(92.0), "EXCELLENT");
        assert_eq!(qualitative_label(70.0), "GOOD");
        assert_eq!(qualitative_label(65.0), "AVERAGE");
        assert_eq!(qualitative_label(59.0), "NEEDS IMPROVEMENT");
        assert_eq!(qualitative_label(0.0), "NEEDS IMPROVEMENT");
    }

    #[test]
    fn test_build_scorecard_uses_overall_score() {
        let card = build_scorecard(analysis_with(CriteriaRatings::default()));
        assert_eq!(card.overall_score, 72.0);
        assert_eq!(card.overall_label, "GOOD");
        assert_eq!(card.overall_tier, ScoreTier::Moderate);
        assert_eq!(card.categories.len(), 6);
    }
}
