mod analysis;
mod api_client;
mod cli;
mod config;
mod credential;
mod errors;
mod notify;
mod report;
mod session;
mod submission;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::RawAnalysisResponse;
use crate::api_client::AnalysisClient;
use crate::cli::{AnalyzeArgs, Cli, Commands, KeyArgs, OutputArgs, ScoreArgs};
use crate::config::Config;
use crate::credential::Credential;
use crate::errors::AppError;
use crate::notify::{ChannelNotifier, Notification, NotificationVariant, Notifier};
use crate::report::{render_text, ExportOptions};
use crate::session::{AnalysisReport, AnalysisSession};
use crate::submission::ResumeDocument;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting ATS scorecard v{}", env!("CARGO_PKG_VERSION"));

    // Notifications are drained by an observer task so the core never blocks on them.
    let (notifier, mut notifications) = ChannelNotifier::new();
    let observer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            print_notification(&notification);
        }
    });

    let client = AnalysisClient::new(config.api_url.clone())?;
    info!("Analysis service: {}", client.base_url());

    let notifier: Arc<dyn Notifier> = Arc::new(notifier);
    let mut session = AnalysisSession::new(client, config.experience_policy, notifier);

    let outcome = match cli.command {
        Commands::ValidateKey(args) => validate_key(&mut session, args).await,
        Commands::Analyze(args) => analyze(&mut session, args, &config).await,
        Commands::Score(args) => score(&mut session, args, &config).await,
    };

    // Dropping the session closes the channel and lets the observer finish.
    drop(session);
    join_observer(observer).await;
    outcome
}

async fn join_observer(observer: JoinHandle<()>) {
    if let Err(e) = observer.await {
        warn!("Notification observer ended abnormally: {e}");
    }
}

async fn validate_key(session: &mut AnalysisSession, args: KeyArgs) -> Result<()> {
    session.set_credential(Credential::new(args.api_key));
    if session.validate_credential().await {
        println!("API key is valid");
        Ok(())
    } else {
        anyhow::bail!("API key is invalid")
    }
}

async fn analyze(session: &mut AnalysisSession, args: AnalyzeArgs, config: &Config) -> Result<()> {
    let job_description = match &args.job_description_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description: {}", path.display()))?,
        None => args.job_description.clone(),
    };

    session.set_credential(Credential::new(args.key.api_key));
    session.set_job_title(args.job_title);
    session.set_company_name(args.company);
    session.set_job_description(job_description);
    session.set_experience_years(args.experience);

    if !session.validate_credential().await {
        anyhow::bail!("API key is invalid");
    }

    let batch = args.resume.len() > 1;
    for (i, path) in args.resume.iter().enumerate() {
        if i > 0 {
            // Back to the form for the next resume; job details and key stay.
            session.reset();
            println!();
        }
        session.set_document(ResumeDocument::from_path(path).await?);
        let report = session.analyze().await.map_err(surface)?.clone();
        let file_name = batch.then(|| batch_file_name(path));
        finish(session, &report, &args.output, config, file_name).await?;
    }
    Ok(())
}

/// Per-resume PDF name so a batch export does not overwrite itself.
fn batch_file_name(resume: &Path) -> String {
    let stem = resume
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("resume");
    format!("resume-analysis-results-{stem}.pdf")
}

async fn score(session: &mut AnalysisSession, args: ScoreArgs, config: &Config) -> Result<()> {
    let contents = tokio::fs::read_to_string(&args.response)
        .await
        .with_context(|| format!("Failed to read response file: {}", args.response.display()))?;

    let report = session
        .show_results(RawAnalysisResponse::from_saved(contents))
        .clone();
    finish(session, &report, &args.output, config, None).await
}

/// Prints the scorecard and runs the optional export.
async fn finish(
    session: &mut AnalysisSession,
    report: &AnalysisReport,
    output: &OutputArgs,
    config: &Config,
    file_name: Option<String>,
) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        if report.degradation.is_some() {
            println!("(The analysis response could not be read; showing empty results.)\n");
        }
        if let Some(experience) = &report.experience {
            println!("Candidate experience: {experience}\n");
        }
        print!("{}", render_text(&report.scorecard));
    }

    if output.export {
        let dir: PathBuf = output
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone());
        let mut options = ExportOptions::in_dir(dir);
        if let Some(name) = file_name {
            options.file_name = name;
        }
        session.set_export_options(options);
        let path = session.export_report().await.map_err(surface)?;
        println!("\nSaved {}", path.display());
    }
    Ok(())
}

/// The user already saw the notification; keep the detail for the exit status.
fn surface(error: AppError) -> anyhow::Error {
    anyhow::anyhow!(error.to_string())
}

fn print_notification(notification: &Notification) {
    let marker = match notification.variant {
        NotificationVariant::Default => "ok",
        NotificationVariant::Destructive => "error",
    };
    eprintln!(
        "[{marker}] {}: {}",
        notification.title, notification.description
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::ExperiencePolicy;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAYLOAD: &str = "{\"overall_score\": 70, \"ats_criteria_ratings\": {\"job_fit_score\": 7}}";

    fn config(uri: &str, output_dir: &Path) -> Config {
        Config {
            api_url: uri.to_string(),
            output_dir: output_dir.to_path_buf(),
            experience_policy: ExperiencePolicy::AcceptFresher,
            rust_log: "info".to_string(),
        }
    }

    fn session(uri: &str) -> (AnalysisSession, UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::new();
        let client = AnalysisClient::new(uri).unwrap();
        (
            AnalysisSession::new(client, ExperiencePolicy::AcceptFresher, Arc::new(notifier)),
            rx,
        )
    }

    fn analyze_args(resume: Vec<PathBuf>, export: bool) -> AnalyzeArgs {
        AnalyzeArgs {
            key: KeyArgs {
                api_key: "AIza-cli-key".to_string(),
            },
            resume,
            job_title: "Platform Engineer".to_string(),
            company: String::new(),
            job_description: String::new(),
            job_description_file: None,
            experience: 4,
            output: OutputArgs {
                json: false,
                export,
                output_dir: None,
            },
        }
    }

    async fn write_resume(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, b"%PDF-1.4\n%%EOF\n").await.unwrap();
        path
    }

    async fn mount_validation(server: &MockServer, valid: bool) {
        Mock::given(method("POST"))
            .and(path("/validate-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": valid })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_invalid_key_stops_before_upload() {
        let server = MockServer::start().await;
        mount_validation(&server, false).await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let resume = write_resume(dir.path(), "cv.pdf").await;
        let (mut s, mut rx) = session(&server.uri());

        let err = analyze(
            &mut s,
            analyze_args(vec![resume], false),
            &config(&server.uri(), dir.path()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "API key is invalid");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_each_resume_analyzed_and_exported_in_turn() {
        let server = MockServer::start().await;
        mount_validation(&server, true).await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": PAYLOAD })))
            .expect(2)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let first = write_resume(dir.path(), "alice.pdf").await;
        let second = write_resume(dir.path(), "bob.pdf").await;
        let (mut s, _rx) = session(&server.uri());

        analyze(
            &mut s,
            analyze_args(vec![first, second], true),
            &config(&server.uri(), dir.path()),
        )
        .await
        .unwrap();

        assert!(dir.path().join("resume-analysis-results-alice.pdf").exists());
        assert!(dir.path().join("resume-analysis-results-bob.pdf").exists());
        assert!(!dir.path().join("resume-analysis-results.pdf").exists());
    }

    #[test]
    fn test_batch_file_name_uses_resume_stem() {
        assert_eq!(
            batch_file_name(Path::new("/tmp/Jane Doe.pdf")),
            "resume-analysis-results-Jane Doe.pdf"
        );
    }

    #[tokio::test]
    async fn test_crashed_observer_does_not_propagate() {
        let observer = tokio::spawn(async { panic!("observer crashed") });
        join_observer(observer).await;
    }
}
