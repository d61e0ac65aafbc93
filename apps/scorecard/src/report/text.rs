use std::fmt::Write;

use crate::analysis::Scorecard;
use crate::report::view::{REPORT_BYLINE, REPORT_TITLE};

const BAR_WIDTH: usize = 20;

/// Renders a scorecard for a terminal.
pub fn render_text(card: &Scorecard) -> String {
    let mut out = String::new();
    let analysis = &card.analysis;

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{REPORT_TITLE}");
    let _ = writeln!(out, "{REPORT_BYLINE}");
    let _ = writeln!(out, "{}", "-".repeat(REPORT_BYLINE.len()));
    let _ = writeln!(
        out,
        "Overall Resume Score: {} ({})",
        format_score(card.overall_score),
        card.overall_label
    );
    if let Some(confidence) = analysis.confidence {
        let _ = writeln!(out, "Assessment confidence: {confidence:.0}%");
    }

    if !analysis.summary.is_empty() {
        let _ = writeln!(out, "\nSummary\n  {}", analysis.summary);
    }
    write_list(&mut out, "Strengths", &analysis.strengths);
    write_list(&mut out, "Areas for Improvement", &analysis.weaknesses);

    let _ = writeln!(out, "\nATS Criteria Ratings");
    for c in &card.categories {
        let _ = writeln!(
            out,
            "  {:<28} {} {:>5}%  ({}/10)",
            c.name,
            bar(c.percentage),
            format_score(c.percentage),
            format_score(c.raw_rating)
        );
    }
    out
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Whole numbers print without a fraction; others keep one decimal.
fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
