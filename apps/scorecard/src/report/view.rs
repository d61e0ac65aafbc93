//! The results page as an element tree.
//!
//! Export capture works on this tree: elements flagged `export_excluded` are the
//! navigation and action chrome that must not appear in the PDF. Element ids are
//! unique within a view.

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::analysis::{ScoreCategory, ScoreTier, Scorecard};

/// Id of the region captured into the PDF.
pub const CAPTURE_REGION_ID: &str = "pdf-content";

pub const REPORT_TITLE: &str = "Resume Analysis Report";
pub const REPORT_BYLINE: &str = "Generated by HireMe ATS AI Assistant";

const MOTIVATIONAL_QUOTES: [&str; 4] = [
    "Your next opportunity is just one optimized resume away!",
    "Every rejection is a redirection to something better.",
    "Success is where preparation meets opportunity.",
    "The best time to plant a tree was 20 years ago. The second best time is now.",
];

// ────────────────────────────────────────────────────────────────────────────
// Elements
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Container,
    Heading { text: String },
    Text { text: String },
    Rule,
    BulletList { items: Vec<String>, marker: [u8; 3] },
    /// The large overall-score gauge.
    Gauge {
        score: f64,
        label: &'static str,
        tier: ScoreTier,
    },
    /// One criterion card.
    ScoreCircle {
        title: &'static str,
        description: &'static str,
        percentage: f64,
        raw_rating: f64,
        tier: ScoreTier,
    },
    Button { label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub export_excluded: bool,
    pub visible: bool,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            export_excluded: false,
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn container(id: impl Into<String>, children: Vec<Element>) -> Self {
        Self {
            children,
            ..Self::new(id, ElementKind::Container)
        }
    }

    pub fn heading(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Heading { text: text.into() })
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Text { text: text.into() })
    }

    pub fn button(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Button { label: label.into() })
    }

    /// Marks the element as chrome that never appears in an export.
    pub fn excluded(mut self) -> Self {
        self.export_excluded = true;
        self
    }

    fn find(&self, id: &str) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// View
// ────────────────────────────────────────────────────────────────────────────

/// A rendered results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    root: Element,
}

impl ResultsView {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.root.find_mut(id)
    }

    /// `(id, visible)` for every element, depth first.
    #[cfg(test)]
    pub fn visibility_snapshot(&self) -> Vec<(String, bool)> {
        let mut all = Vec::new();
        self.root.walk(&mut all);
        all.into_iter().map(|e| (e.id.clone(), e.visible)).collect()
    }

    /// Hides every export-excluded element. Returns each touched id with its
    /// prior visibility so the caller can put it back exactly.
    pub fn hide_export_excluded(&mut self) -> Vec<(String, bool)> {
        let mut all = Vec::new();
        self.root.walk(&mut all);
        let excluded: Vec<(String, bool)> = all
            .into_iter()
            .filter(|e| e.export_excluded)
            .map(|e| (e.id.clone(), e.visible))
            .collect();

        for (id, _) in &excluded {
            if let Some(element) = self.find_mut(id) {
                element.visible = false;
            }
        }
        excluded
    }

    pub fn restore_visibility(&mut self, prior: &[(String, bool)]) {
        for (id, visible) in prior {
            if let Some(element) = self.find_mut(id) {
                element.visible = *visible;
            }
        }
    }
}

/// Builds the results page for a scorecard.
pub fn build_results_view(card: &Scorecard) -> ResultsView {
    let quote = MOTIVATIONAL_QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOTIVATIONAL_QUOTES[0]);

    let header = Element::container(
        "results-header",
        vec![
            Element::button("back-to-upload", "Back to Upload"),
            Element::heading("complete-title", "Resume Analysis Complete"),
            Element::text("motivational-quote", quote),
        ],
    )
    .excluded();

    let mut overall = vec![
        Element::heading("overall-title", "Overall Resume Score"),
        Element::new(
            "overall-gauge",
            ElementKind::Gauge {
                score: card.overall_score,
                label: card.overall_label,
                tier: card.overall_tier,
            },
        ),
    ];
    if let Some(confidence) = card.analysis.confidence {
        overall.push(Element::text(
            "confidence",
            format!("Assessment confidence: {confidence:.0}%"),
        ));
    }

    let analysis = &card.analysis;
    let content = Element::container(
        CAPTURE_REGION_ID,
        vec![
            Element::container(
                "report-title-block",
                vec![
                    Element::heading("report-title", REPORT_TITLE),
                    Element::text("report-byline", REPORT_BYLINE),
                    Element::new("report-rule", ElementKind::Rule),
                ],
            ),
            Element::container("overall-score", overall),
            Element::container(
                "summary",
                vec![
                    Element::heading("summary-title", "Summary"),
                    Element::text("summary-text", analysis.summary.clone()),
                ],
            ),
            Element::container(
                "strengths",
                vec![
                    Element::heading("strengths-title", "Strengths"),
                    Element::new(
                        "strengths-list",
                        ElementKind::BulletList {
                            items: analysis.strengths.clone(),
                            marker: ScoreTier::Strong.rgb(),
                        },
                    ),
                ],
            ),
            Element::container(
                "weaknesses",
                vec![
                    Element::heading("weaknesses-title", "Areas for Improvement"),
                    Element::new(
                        "weaknesses-list",
                        ElementKind::BulletList {
                            items: analysis.weaknesses.clone(),
                            marker: [0xf9, 0x73, 0x16],
                        },
                    ),
                ],
            ),
            Element::container("criteria", criteria_cards(&card.categories)),
        ],
    );

    let actions = Element::container(
        "quick-actions",
        vec![
            Element::button("download-analysis", "Download Analysis"),
            Element::button("analyze-another", "Analyze Another Resume"),
        ],
    )
    .excluded();

    ResultsView::new(Element::container(
        "results-page",
        vec![header, content, actions],
    ))
}

fn criteria_cards(categories: &[ScoreCategory]) -> Vec<Element> {
    let mut cards = vec![Element::heading("criteria-title", "ATS Criteria Ratings")];
    cards.extend(categories.iter().map(|c| {
        Element::new(
            format!("criterion-{}", c.criterion.payload_key()),
            ElementKind::ScoreCircle {
                title: c.name,
                description: c.description,
                percentage: c.percentage,
                raw_rating: c.raw_rating,
                tier: c.tier,
            },
        )
    }));
    cards
}
