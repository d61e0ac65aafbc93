//! One user's form session: the fields being edited, the credential check, the
//! analysis round-trip, and the results page with its export.
//!
//! Every mutating operation takes `&mut self`, so one session can have at most
//! one submission or export in flight.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{build_scorecard, parse, ParseOutcome, RawAnalysisResponse, Scorecard};
use crate::api_client::AnalysisClient;
use crate::credential::{self, Credential};
use crate::errors::AppError;
use crate::notify::{Notification, Notifier};
use crate::report::{
    build_results_view, BlockRasterizer, ExportError, ExportOptions, Rasterizer, ReportExporter,
    ResultsView, CAPTURE_REGION_ID,
};
use crate::submission::{
    experience_label, validate, ExperiencePolicy, ResumeDocument, SubmissionFields,
};

/// The outcome of one analysis, as shown on the results page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub scorecard: Scorecard,
    /// Slider label of the submission ("Fresher", "3 Years"). Absent for saved responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Why the payload fell back to defaults, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<String>,
}

struct Results {
    report: AnalysisReport,
    view: ResultsView,
}

pub struct AnalysisSession<R: Rasterizer = BlockRasterizer> {
    client: AnalysisClient,
    policy: ExperiencePolicy,
    notifier: Arc<dyn Notifier>,
    exporter: ReportExporter<R>,
    export_options: ExportOptions,
    fields: SubmissionFields,
    results: Option<Results>,
}

impl AnalysisSession<BlockRasterizer> {
    pub fn new(
        client: AnalysisClient,
        policy: ExperiencePolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_exporter(client, policy, notifier, ReportExporter::new(BlockRasterizer))
    }
}

impl<R: Rasterizer> AnalysisSession<R> {
    pub fn with_exporter(
        client: AnalysisClient,
        policy: ExperiencePolicy,
        notifier: Arc<dyn Notifier>,
        exporter: ReportExporter<R>,
    ) -> Self {
        Self {
            client,
            policy,
            notifier,
            exporter,
            export_options: ExportOptions::default(),
            fields: SubmissionFields::default(),
            results: None,
        }
    }

    pub fn set_export_options(&mut self, options: ExportOptions) {
        self.export_options = options;
    }

    // ── Form editing ─────────────────────────────────────────────────────────

    /// Replaces the credential. A new credential is unvalidated.
    pub fn set_credential(&mut self, credential: Credential) {
        self.fields.credential = credential;
        self.fields.credential_validated = false;
    }

    pub fn set_document(&mut self, document: ResumeDocument) {
        self.fields.document = Some(document);
    }

    pub fn set_job_title(&mut self, title: impl Into<String>) {
        self.fields.job_title = title.into();
    }

    pub fn set_company_name(&mut self, company: impl Into<String>) {
        self.fields.company_name = company.into();
    }

    pub fn set_job_description(&mut self, description: impl Into<String>) {
        self.fields.job_description = description.into();
    }

    pub fn set_experience_years(&mut self, years: u8) {
        self.fields.experience_years = years;
    }

    /// Checks the current credential with the backend and records the verdict.
    /// A blank credential is invalid without a request.
    pub async fn validate_credential(&mut self) -> bool {
        if self.fields.credential.is_blank() {
            self.fields.credential_validated = false;
            return false;
        }

        let valid = match credential::obfuscate(&self.fields.credential) {
            Ok(token) => self.client.validate_credential(&token).await,
            Err(e) => {
                warn!("Could not encode credential for verification: {e}");
                false
            }
        };
        self.fields.credential_validated = valid;
        valid
    }

    // ── Analysis ─────────────────────────────────────────────────────────────

    /// Validates the form, submits a snapshot, and shows the results.
    pub async fn analyze(&mut self) -> Result<&AnalysisReport, AppError> {
        let errors = validate(&self.fields, self.policy);
        if !errors.is_empty() {
            return Err(self.fail(AppError::Validation(errors)));
        }

        let snapshot = self.fields.clone();
        info!(
            job_title = %snapshot.job_title,
            experience = snapshot.experience_years,
            "Starting resume analysis"
        );

        let raw = match self.client.submit(&snapshot).await {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };

        self.notifier.notify(Notification::success(
            "Analysis Complete!",
            "Your resume has been successfully analyzed",
        ));
        let experience = experience_label(snapshot.experience_years);
        Ok(self.present(raw, Some(experience)))
    }

    /// Parses a raw response and makes it the current results page.
    pub fn show_results(&mut self, raw: RawAnalysisResponse) -> &AnalysisReport {
        self.present(raw, None)
    }

    fn present(
        &mut self,
        raw: RawAnalysisResponse,
        experience: Option<String>,
    ) -> &AnalysisReport {
        let outcome = parse(&raw);
        let degradation = match &outcome {
            ParseOutcome::Degraded { reason, .. } => Some(reason.clone()),
            ParseOutcome::Parsed(_) => None,
        };
        let scorecard = build_scorecard(outcome.into_analysis());
        let view = build_results_view(&scorecard);

        let results = self.results.insert(Results {
            report: AnalysisReport {
                scorecard,
                experience,
                degradation,
            },
            view,
        });
        &results.report
    }

    // ── Export ───────────────────────────────────────────────────────────────

    /// Writes the current results page to PDF. Failure leaves the results intact.
    pub async fn export_report(&mut self) -> Result<PathBuf, AppError> {
        let outcome = match self.results.as_mut() {
            Some(results) => {
                self.exporter
                    .export(&mut results.view, CAPTURE_REGION_ID, &self.export_options)
                    .await
            }
            None => Err(ExportError::RegionNotFound(CAPTURE_REGION_ID.to_string())),
        };

        match outcome {
            Ok(path) => {
                self.notifier.notify(Notification::success(
                    "PDF Downloaded",
                    "Your resume analysis results have been saved as PDF.",
                ));
                Ok(path)
            }
            Err(e) => Err(self.fail(AppError::from(e))),
        }
    }

    /// Leaves the results page and returns to the form ("Analyze Another Resume").
    /// The form keeps its fields and credential state.
    pub fn reset(&mut self) {
        self.results = None;
    }

    fn fail(&self, error: AppError) -> AppError {
        self.notifier.notify(error.notification());
        error
    }
}

#[cfg(test)]
impl<R: Rasterizer> AnalysisSession<R> {
    pub fn fields(&self) -> &SubmissionFields {
        &self.fields
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.results.as_ref().map(|r| &r.report)
    }

    pub fn results_view(&self) -> Option<&ResultsView> {
        self.results.as_ref().map(|r| &r.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChannelNotifier, NotificationVariant};
    use crate::report::raster::{Raster, RasterError, Rgb};
    use crate::report::view::Element;
    use crate::submission::PDF_CONTENT_TYPE;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAYLOAD: &str = "```json\n{\"overall_score\": 82, \"pros\": [\"Clear\"], \"ats_criteria_ratings\": {\"skill_match_score\": 8.5}}\n```";

    fn session(uri: &str) -> (AnalysisSession, UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::new();
        let client = AnalysisClient::new(uri).unwrap();
        (
            AnalysisSession::new(client, ExperiencePolicy::AcceptFresher, Arc::new(notifier)),
            rx,
        )
    }

    fn fill_form<R: Rasterizer>(s: &mut AnalysisSession<R>) {
        s.set_credential(Credential::new("AIza-session-key"));
        s.set_document(ResumeDocument::new(
            "cv.pdf",
            PDF_CONTENT_TYPE,
            b"%PDF-1.4\n".to_vec(),
        ));
        s.set_job_title("Site Reliability Engineer");
    }

    async fn mount_backend(server: &MockServer, valid: bool) {
        Mock::given(method("POST"))
            .and(path("/validate-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": valid })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": PAYLOAD })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_full_flow_notifies_and_shows_results() {
        let server = MockServer::start().await;
        mount_backend(&server, true).await;
        let (mut s, mut rx) = session(&server.uri());
        fill_form(&mut s);

        assert!(s.validate_credential().await);
        let report = s.analyze().await.unwrap();
        assert_eq!(report.scorecard.overall_score, 82.0);
        assert_eq!(report.scorecard.categories[0].percentage, 85.0);
        assert!(report.degradation.is_none());
        assert_eq!(report.experience.as_deref(), Some("Fresher"));

        let n = rx.recv().await.unwrap();
        assert_eq!(n.title, "Analysis Complete!");
        assert_eq!(n.variant, NotificationVariant::Default);
        assert!(s.results_view().unwrap().find(CAPTURE_REGION_ID).is_some());
    }

    #[tokio::test]
    async fn test_unvalidated_credential_blocks_submission() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (mut s, mut rx) = session(&server.uri());
        fill_form(&mut s);

        match s.analyze().await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
        let n = rx.recv().await.unwrap();
        assert_eq!(n.title, "Please fill in all required fields");
        assert_eq!(n.variant, NotificationVariant::Destructive);
    }

    #[tokio::test]
    async fn test_changing_credential_clears_validation() {
        let server = MockServer::start().await;
        mount_backend(&server, true).await;
        let (mut s, _rx) = session(&server.uri());
        fill_form(&mut s);

        assert!(s.validate_credential().await);
        s.set_credential(Credential::new("another-key"));
        assert!(!s.fields().credential_validated);
    }

    #[tokio::test]
    async fn test_rejected_credential_recorded() {
        let server = MockServer::start().await;
        mount_backend(&server, false).await;
        let (mut s, _rx) = session(&server.uri());
        fill_form(&mut s);

        assert!(!s.validate_credential().await);
        assert!(!s.fields().credential_validated);
    }

    #[tokio::test]
    async fn test_blank_credential_never_hits_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (mut s, _rx) = session(&server.uri());
        s.set_credential(Credential::new("   "));
        assert!(!s.validate_credential().await);
    }

    #[tokio::test]
    async fn test_backend_failure_notifies_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/validate-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Traceback: boom"))
            .mount(&server)
            .await;
        let (mut s, mut rx) = session(&server.uri());
        fill_form(&mut s);
        s.validate_credential().await;

        assert!(matches!(s.analyze().await, Err(AppError::Analysis(_))));
        let n = rx.recv().await.unwrap();
        assert_eq!(n.title, "Error");
        assert_eq!(n.description, "Failed to analyze resume. Please try again.");
        assert!(s.report().is_none());
    }

    #[tokio::test]
    async fn test_degraded_payload_still_shows_results() {
        let (mut s, _rx) = session("http://127.0.0.1:9");
        let report = s.show_results(RawAnalysisResponse::Text("not json at all".to_string()));
        assert!(report.degradation.is_some());
        assert!(report.experience.is_none());
        assert_eq!(report.scorecard.overall_score, 0.0);
    }

    #[tokio::test]
    async fn test_export_without_results_fails() {
        let (mut s, mut rx) = session("http://127.0.0.1:9");
        assert!(matches!(
            s.export_report().await,
            Err(AppError::Export(ExportError::RegionNotFound(_)))
        ));
        let n = rx.recv().await.unwrap();
        assert_eq!(n.description, "Unable to generate PDF. Please try again.");
    }

    #[tokio::test]
    async fn test_export_writes_pdf_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (mut s, mut rx) = session("http://127.0.0.1:9");
        s.set_export_options(ExportOptions::in_dir(dir.path()));
        s.show_results(RawAnalysisResponse::Text(PAYLOAD.to_string()));

        let path = s.export_report().await.unwrap();
        assert!(path.exists());
        assert_eq!(rx.recv().await.unwrap().title, "PDF Downloaded");
    }

    struct BrokenRasterizer;

    #[async_trait]
    impl Rasterizer for BrokenRasterizer {
        async fn rasterize(&self, _: &Element, _: f32, _: Rgb) -> Result<Raster, RasterError> {
            Err(RasterError::Backend("out of memory".to_string()))
        }
    }

    #[tokio::test]
    async fn test_export_failure_keeps_results_and_restores_view() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let mut s = AnalysisSession::with_exporter(
            AnalysisClient::new("http://127.0.0.1:9").unwrap(),
            ExperiencePolicy::AcceptFresher,
            Arc::new(notifier),
            ReportExporter::new(BrokenRasterizer),
        );
        s.show_results(RawAnalysisResponse::Text(PAYLOAD.to_string()));
        let before = s.results_view().unwrap().visibility_snapshot();

        assert!(s.export_report().await.is_err());
        assert_eq!(
            rx.recv().await.unwrap().description,
            "Failed to generate PDF. Please try again."
        );
        assert!(s.report().is_some());
        assert_eq!(s.results_view().unwrap().visibility_snapshot(), before);
    }

    #[test]
    fn test_report_json_carries_experience() {
        let report = AnalysisReport {
            scorecard: build_scorecard(Default::default()),
            experience: Some("3 Years".to_string()),
            degradation: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["experience"], "3 Years");
        assert_eq!(json["scorecard"]["overallLabel"], "NEEDS IMPROVEMENT");
        assert!(json.get("degradation").is_none());
    }

    #[tokio::test]
    async fn test_reset_keeps_form() {
        let (mut s, _rx) = session("http://127.0.0.1:9");
        fill_form(&mut s);
        s.show_results(RawAnalysisResponse::Text(PAYLOAD.to_string()));

        s.reset();
        assert!(s.report().is_none());
        assert_eq!(s.fields().job_title, "Site Reliability Engineer");
    }
}
