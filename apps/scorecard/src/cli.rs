use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::submission::MAX_EXPERIENCE_YEARS;

#[derive(Parser, Debug)]
#[command(name = "ats-scorecard")]
#[command(about = "Score a resume against a job posting with the ATS analysis service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an API key with the analysis service
    ValidateKey(KeyArgs),

    /// Upload a resume for analysis and print its scorecard
    Analyze(AnalyzeArgs),

    /// Build a scorecard from a saved analysis response (no network)
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Provider API key
    #[arg(long, env = "ATS_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Resume to analyze (PDF, up to 10MB). Repeat to analyze several against the same job
    #[arg(long, required = true, num_args = 1..)]
    pub resume: Vec<PathBuf>,

    /// Target job title
    #[arg(long)]
    pub job_title: String,

    /// Company name
    #[arg(long, default_value = "")]
    pub company: String,

    /// Job description text
    #[arg(long, default_value = "", conflicts_with = "job_description_file")]
    pub job_description: String,

    /// Read the job description from a file
    #[arg(long)]
    pub job_description_file: Option<PathBuf>,

    /// Years of experience (0 = Fresher)
    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=MAX_EXPERIENCE_YEARS as i64)
    )]
    pub experience: u8,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Saved response: the service's JSON envelope or the bare payload
    pub response: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Print the scorecard as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write resume-analysis-results.pdf
    #[arg(long)]
    pub export: bool,

    /// Directory for the exported PDF (overrides ATS_OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
