//! Analysis payload handling: raw response, parsing, and score derivation.

pub mod models;
pub mod parser;
pub mod scoring;

pub use models::RawAnalysisResponse;
pub use parser::{parse, ParseOutcome};
pub use scoring::{build_scorecard, ScoreCategory, ScoreTier, Scorecard};
