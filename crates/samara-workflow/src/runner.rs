//! The sequential workflow pipeline.
//!
//! [`WorkflowRunner`] classifies a prompt into an [`Intent`], then walks
//! a fixed six-stage pipeline: plan, gather source data, create a
//! document, create a presentation, send notifications, schedule a
//! review meeting.  Planning always runs; every other stage runs only
//! when its intent flag is set, and always in this order.  Stages
//! execute strictly one after another — there is no human gating here
//! and no parallelism.
//!
//! Progress is reported through a caller-supplied callback: every stage
//! emits a `Processing` report on entry and a `Completed` report on
//! success.  The first stage error aborts the whole run and propagates
//! unmodified after an `Error` report; only the documented per-file case
//! inside the gather stage is tolerated.

use chrono::{Days, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use samara_graph::{
    CalendarEvent, DateTimeTimeZone, DriveItem, ItemBody, MailMessage, OfficeService,
    WorkbookRange,
};

use crate::classifier::{Intent, IntentClassifier};
use crate::compliance::{ComplianceCategory, ComplianceLog};
use crate::content;
use crate::error::{Result, WorkflowError};

// ---------------------------------------------------------------------------
// Stage names and limits
// ---------------------------------------------------------------------------

/// Stage identifiers as they appear in progress reports.
pub mod stage {
    pub const PLAN: &str = "Planning workflow";
    pub const GATHER: &str = "Gathering source data";
    pub const DOCUMENT: &str = "Creating document";
    pub const DECK: &str = "Creating presentation";
    pub const MAIL: &str = "Sending notifications";
    pub const MEETING: &str = "Scheduling meeting";
}

/// Upper bound on source files read during the gather stage.
const MAX_SOURCE_FILES: usize = 5;

/// Bounded cell range read from each source file (26 columns x 100 rows).
const RANGE_ADDRESS: &str = "A1:Z100";

/// MIME type for created presentation files.
const PRESENTATION_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

// Slide generation is a placeholder: the presentation file is created
// empty and reported with fixed counts.
const PLACEHOLDER_SLIDE_COUNT: usize = 12;
const PLACEHOLDER_CHART_COUNT: usize = 5;

// Manual-effort constants used for the time-saved estimate.
const MANUAL_PLANNING_MS: u64 = 30 * 60 * 1000;
const MANUAL_PER_SOURCE_FILE_MS: u64 = 45 * 60 * 1000;
const MANUAL_DOCUMENT_MS: u64 = 2 * 60 * 60 * 1000;
const MANUAL_DECK_MS: u64 = 3 * 60 * 60 * 1000;
const MANUAL_MAIL_MS: u64 = 30 * 60 * 1000;
const MANUAL_MEETING_MS: u64 = 15 * 60 * 1000;

/// How a stage treats a failing sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailurePolicy {
    /// Propagate the error and abort the run.
    Abort,
    /// Log, skip the failing item, and keep going.
    SkipAndContinue,
}

/// Per-file reads inside the gather stage tolerate individual failures;
/// every other remote call in the pipeline aborts the run.
const GATHER_PER_FILE_POLICY: FailurePolicy = FailurePolicy::SkipAndContinue;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// The phase a stage report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// The stage has started.
    Processing,
    /// The stage finished successfully.
    Completed,
    /// The stage failed; the run is aborting.
    Error,
}

/// A transient progress record handed to the caller's callback at each
/// stage transition.  The runner does not retain these beyond the
/// completed-steps list on the final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Stage identifier (see [`stage`]).
    pub step: String,
    pub phase: StepPhase,
    /// Human description of what is happening.
    pub description: String,
    /// Outcome summary, present on `Completed` reports.
    #[serde(default)]
    pub result: Option<String>,
    /// Files the stage created, when any.
    #[serde(default)]
    pub files_created: Option<Vec<String>>,
    /// Stage wall-clock time, present on `Completed` reports.
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
}

impl StepReport {
    fn processing(step: &str, description: &str) -> Self {
        Self {
            step: step.to_string(),
            phase: StepPhase::Processing,
            description: description.to_string(),
            result: None,
            files_created: None,
            elapsed_ms: None,
        }
    }

    fn completed(
        step: &str,
        description: &str,
        result: String,
        files_created: Option<Vec<String>>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            step: step.to_string(),
            phase: StepPhase::Completed,
            description: description.to_string(),
            result: Some(result),
            files_created,
            elapsed_ms: Some(elapsed_ms),
        }
    }

    fn failed(step: &str, error: &WorkflowError) -> Self {
        Self {
            step: step.to_string(),
            phase: StepPhase::Error,
            description: error.to_string(),
            result: None,
            files_created: None,
            elapsed_ms: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage outputs
// ---------------------------------------------------------------------------

/// Per-file aggregation from the gather stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// Aggregated row/column accounting across all readable source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatheredData {
    pub files: Vec<SourceFileSummary>,
    pub total_rows: usize,
}

impl GatheredData {
    /// Number of files that were actually read.
    pub fn files_found(&self) -> usize {
        self.files.len()
    }
}

/// The final aggregation of a fully successful run.  Failed runs produce
/// no partial result — only the propagated error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunResult {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// `Completed` reports for every stage that ran, in pipeline order.
    pub completed_steps: Vec<StepReport>,
    /// Wall-clock time for the whole run.
    pub total_elapsed_ms: u64,
    /// Manual-effort estimate minus actual elapsed time.  Signed: a very
    /// fast run with few flags can come out negative, and that is
    /// reported as computed.
    pub estimated_time_saved_ms: i64,
    /// One-line human summary of the run.
    pub summary_text: String,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Executes the flag-gated pipeline against an [`OfficeService`].
///
/// Owns its compliance log and the `files_created` accumulation; both
/// are mutated only by the single-threaded run, so no locking exists by
/// construction.
pub struct WorkflowRunner<S> {
    service: S,
    classifier: IntentClassifier,
    compliance: ComplianceLog,
}

impl<S: OfficeService> WorkflowRunner<S> {
    /// Create a runner over the given service backend.
    pub fn new(service: S) -> Self {
        Self {
            service,
            classifier: IntentClassifier::new(),
            compliance: ComplianceLog::new(),
        }
    }

    /// The audit trail of externally-visible operations so far.
    pub fn compliance(&self) -> &ComplianceLog {
        &self.compliance
    }

    /// Classify a prompt without running anything.
    pub fn classify(&self, prompt: &str) -> Intent {
        self.classifier.classify(prompt)
    }

    /// Run the full pipeline for one prompt.
    ///
    /// `on_report` is invoked at every stage transition, in pipeline
    /// order.  Stages await real network latency, so the caller must not
    /// assume the callback fires synchronously with the call to `run`.
    pub async fn run<F>(
        &mut self,
        prompt: &str,
        token: &str,
        mut on_report: F,
    ) -> Result<WorkflowRunResult>
    where
        F: FnMut(StepReport) + Send,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(WorkflowError::EmptyPrompt);
        }

        let run_id = Uuid::now_v7();
        let started = Instant::now();
        let intent = self.classifier.classify(prompt);
        info!(
            %run_id,
            apps = intent.app_count(),
            actions = intent.actions.count(),
            "starting workflow run"
        );

        let mut completed: Vec<StepReport> = Vec::new();
        let mut files_created: Vec<String> = Vec::new();
        let mut gathered: Option<GatheredData> = None;

        // Stage 1: plan.  Always runs, flag-independent.
        on_report(StepReport::processing(
            stage::PLAN,
            "Analyzing the request and planning the workflow",
        ));
        let stage_started = Instant::now();
        let report = StepReport::completed(
            stage::PLAN,
            "Workflow planned",
            format!(
                "Identified {} actions across {} applications",
                intent.actions.count(),
                intent.app_count()
            ),
            None,
            elapsed_ms(stage_started),
        );
        completed.push(report.clone());
        on_report(report);

        // Stage 2: gather source data.
        if intent.needs_data_source {
            on_report(StepReport::processing(
                stage::GATHER,
                "Finding and reading spreadsheet files",
            ));
            let stage_started = Instant::now();
            let data = self
                .gather_source_data(token)
                .await
                .map_err(|e| abort(&mut on_report, stage::GATHER, e))?;
            let report = StepReport::completed(
                stage::GATHER,
                "Source data gathered",
                format!(
                    "Processed {} spreadsheet files with {} rows of data",
                    data.files_found(),
                    data.total_rows
                ),
                None,
                elapsed_ms(stage_started),
            );
            completed.push(report.clone());
            on_report(report);
            gathered = Some(data);
        }

        // Stage 3: create document.
        if intent.needs_document {
            on_report(StepReport::processing(
                stage::DOCUMENT,
                "Generating the report document",
            ));
            let stage_started = Instant::now();
            let doc = self
                .create_document(token, prompt, gathered.as_ref())
                .await
                .map_err(|e| abort(&mut on_report, stage::DOCUMENT, e))?;
            files_created.push(doc.name.clone());
            let report = StepReport::completed(
                stage::DOCUMENT,
                "Document created",
                format!(
                    "Created \"{}\" with {} pages and {} sections",
                    doc.name, doc.page_count, doc.section_count
                ),
                Some(vec![doc.name]),
                elapsed_ms(stage_started),
            );
            completed.push(report.clone());
            on_report(report);
        }

        // Stage 4: create presentation.
        if intent.needs_deck {
            on_report(StepReport::processing(
                stage::DECK,
                "Building the presentation",
            ));
            let stage_started = Instant::now();
            let deck = self
                .create_presentation(token)
                .await
                .map_err(|e| abort(&mut on_report, stage::DECK, e))?;
            files_created.push(deck.name.clone());
            let report = StepReport::completed(
                stage::DECK,
                "Presentation created",
                format!(
                    "Created \"{}\" with {} slides and {} charts",
                    deck.name, deck.slide_count, deck.chart_count
                ),
                Some(vec![deck.name]),
                elapsed_ms(stage_started),
            );
            completed.push(report.clone());
            on_report(report);
        }

        // Stage 5: send notifications.
        if intent.needs_mail {
            on_report(StepReport::processing(
                stage::MAIL,
                "Composing and sending notifications",
            ));
            let stage_started = Instant::now();
            let mail = self
                .send_notifications(token, prompt, &files_created)
                .await
                .map_err(|e| abort(&mut on_report, stage::MAIL, e))?;
            let report = StepReport::completed(
                stage::MAIL,
                "Notifications sent",
                format!(
                    "Sent {} messages covering {} created files",
                    mail.sent,
                    files_created.len()
                ),
                None,
                elapsed_ms(stage_started),
            );
            completed.push(report.clone());
            on_report(report);
        }

        // Stage 6: schedule the review meeting.
        if intent.needs_meeting {
            on_report(StepReport::processing(
                stage::MEETING,
                "Creating the review meeting",
            ));
            let stage_started = Instant::now();
            let meeting = self
                .schedule_meeting(token, prompt, &files_created)
                .await
                .map_err(|e| abort(&mut on_report, stage::MEETING, e))?;
            let report = StepReport::completed(
                stage::MEETING,
                "Meeting scheduled",
                format!(
                    "Scheduled \"{}\" for {}",
                    meeting.subject, meeting.starts_at
                ),
                None,
                elapsed_ms(stage_started),
            );
            completed.push(report.clone());
            on_report(report);
        }

        let total_elapsed_ms = elapsed_ms(started);
        let manual_ms = manual_time_estimate(&intent, gathered.as_ref());
        let estimated_time_saved_ms = manual_ms as i64 - total_elapsed_ms as i64;
        let summary_text = content::summary_text(
            &intent,
            files_created.len(),
            estimated_time_saved_ms,
            total_elapsed_ms,
        );

        info!(
            %run_id,
            total_elapsed_ms,
            files = files_created.len(),
            "workflow run complete"
        );

        Ok(WorkflowRunResult {
            run_id,
            completed_steps: completed,
            total_elapsed_ms,
            estimated_time_saved_ms,
            summary_text,
        })
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Read up to [`MAX_SOURCE_FILES`] spreadsheets, aggregating row and
    /// column counts.  A file that fails to read is skipped and logged;
    /// failure to list files at all aborts the stage.
    async fn gather_source_data(&mut self, token: &str) -> Result<GatheredData> {
        let files = self.service.list_spreadsheets(token).await?;
        self.compliance.record(
            ComplianceCategory::DataAccess,
            "list spreadsheet files",
            "drive root",
        );

        let mut data = GatheredData::default();
        for file in files.into_iter().take(MAX_SOURCE_FILES) {
            match self.read_first_worksheet(token, &file).await {
                Ok(Some(range)) => {
                    self.compliance.record(
                        ComplianceCategory::DataAccess,
                        "read worksheet range",
                        &file.name,
                    );
                    data.total_rows += range.row_count();
                    data.files.push(SourceFileSummary {
                        name: file.name,
                        rows: range.row_count(),
                        columns: range.column_count(),
                    });
                }
                Ok(None) => debug!(file = %file.name, "workbook has no worksheets; skipping"),
                Err(error) => match GATHER_PER_FILE_POLICY {
                    FailurePolicy::SkipAndContinue => {
                        warn!(file = %file.name, %error, "skipping unreadable source file");
                    }
                    FailurePolicy::Abort => return Err(error.into()),
                },
            }
        }
        Ok(data)
    }

    /// Read the bounded range from a file's first worksheet.
    async fn read_first_worksheet(
        &self,
        token: &str,
        file: &DriveItem,
    ) -> samara_graph::Result<Option<WorkbookRange>> {
        let worksheets = self.service.list_worksheets(token, &file.id).await?;
        let Some(sheet) = worksheets.first() else {
            return Ok(None);
        };
        let range = self
            .service
            .read_range(token, &file.id, &sheet.id, RANGE_ADDRESS)
            .await?;
        Ok(Some(range))
    }

    /// Create the report document and upload its generated body.
    async fn create_document(
        &mut self,
        token: &str,
        prompt: &str,
        gathered: Option<&GatheredData>,
    ) -> Result<DocumentSummary> {
        let name = content::document_file_name(Utc::now().date_naive());
        let file = self.service.create_file(token, &name, None).await?;
        let body = content::document_body(prompt, gathered, Utc::now());
        self.service.upload_text(token, &file.id, &body).await?;
        self.compliance.record(
            ComplianceCategory::FileCreation,
            "create report document",
            &file.name,
        );
        Ok(DocumentSummary {
            name: file.name,
            page_count: content::page_count(&body),
            section_count: content::section_count(&body),
        })
    }

    /// Create the presentation file.  Slide content generation is an
    /// unimplemented deep path; the counts reported are placeholders.
    async fn create_presentation(&mut self, token: &str) -> Result<DeckSummary> {
        let name = content::presentation_file_name(Utc::now().date_naive());
        let file = self
            .service
            .create_file(token, &name, Some(PRESENTATION_MIME))
            .await?;
        self.compliance.record(
            ComplianceCategory::FileCreation,
            "create presentation",
            &file.name,
        );
        Ok(DeckSummary {
            name: file.name,
            slide_count: PLACEHOLDER_SLIDE_COUNT,
            chart_count: PLACEHOLDER_CHART_COUNT,
        })
    }

    /// Send one notification per derived recipient.
    async fn send_notifications(
        &mut self,
        token: &str,
        prompt: &str,
        files_created: &[String],
    ) -> Result<MailSummary> {
        let recipients = content::recipients(prompt);
        let subject = content::mail_subject(prompt);
        let body = content::mail_body(prompt, files_created);

        for address in &recipients {
            let message = MailMessage::text_to(address.as_str(), subject.clone(), body.clone());
            self.service.send_mail(token, &message).await?;
            self.compliance.record(
                ComplianceCategory::Communication,
                "send notification mail",
                address,
            );
        }
        Ok(MailSummary {
            sent: recipients.len(),
        })
    }

    /// Create the review meeting: next calendar day, 14:00–15:00 UTC.
    async fn schedule_meeting(
        &mut self,
        token: &str,
        prompt: &str,
        files_created: &[String],
    ) -> Result<MeetingSummary> {
        let day = Utc::now().date_naive() + Days::new(1);
        let start = day.and_hms_opt(14, 0, 0).expect("in-range wall-clock time");
        let end = day.and_hms_opt(15, 0, 0).expect("in-range wall-clock time");
        let starts_at = start.format("%Y-%m-%dT%H:%M:%S").to_string();

        let event = CalendarEvent {
            subject: content::meeting_subject(prompt),
            body: ItemBody::html(content::meeting_agenda_html(prompt, files_created)),
            start: DateTimeTimeZone::utc(starts_at.clone()),
            end: DateTimeTimeZone::utc(end.format("%Y-%m-%dT%H:%M:%S").to_string()),
            is_online_meeting: true,
            online_meeting_provider: "teamsForBusiness".to_string(),
        };
        let created = self.service.create_event(token, &event).await?;
        self.compliance.record(
            ComplianceCategory::Scheduling,
            "create review meeting",
            &created.subject,
        );
        Ok(MeetingSummary {
            subject: created.subject,
            starts_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Internal stage summaries
// ---------------------------------------------------------------------------

struct DocumentSummary {
    name: String,
    page_count: usize,
    section_count: usize,
}

struct DeckSummary {
    name: String,
    slide_count: usize,
    chart_count: usize,
}

struct MailSummary {
    sent: usize,
}

struct MeetingSummary {
    subject: String,
    starts_at: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

/// Report a stage failure and hand the error back for propagation.
fn abort<F: FnMut(StepReport)>(
    on_report: &mut F,
    stage: &str,
    error: WorkflowError,
) -> WorkflowError {
    error!(stage, %error, "workflow stage failed; aborting run");
    on_report(StepReport::failed(stage, &error));
    error
}

/// Sum the fixed manual-effort constants for the operations whose flag
/// is set, plus the base planning constant.
fn manual_time_estimate(intent: &Intent, gathered: Option<&GatheredData>) -> u64 {
    let mut estimate = MANUAL_PLANNING_MS;
    if intent.needs_data_source
        && let Some(data) = gathered
    {
        estimate += MANUAL_PER_SOURCE_FILE_MS * data.files_found() as u64;
    }
    if intent.needs_document {
        estimate += MANUAL_DOCUMENT_MS;
    }
    if intent.needs_deck {
        estimate += MANUAL_DECK_MS;
    }
    if intent.needs_mail {
        estimate += MANUAL_MAIL_MS;
    }
    if intent.needs_meeting {
        estimate += MANUAL_MEETING_MS;
    }
    estimate
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::IntentClassifier;

    fn intent_for(prompt: &str) -> Intent {
        IntentClassifier::new().classify(prompt)
    }

    #[test]
    fn mail_only_estimate_is_planning_plus_mail() {
        let intent = intent_for("email the team");
        assert_eq!(
            manual_time_estimate(&intent, None),
            MANUAL_PLANNING_MS + MANUAL_MAIL_MS
        );
    }

    #[test]
    fn gather_estimate_scales_with_files_found() {
        let intent = intent_for("merge the excel files");
        let gathered = GatheredData {
            files: vec![
                SourceFileSummary {
                    name: "a.xlsx".into(),
                    rows: 1,
                    columns: 1,
                },
                SourceFileSummary {
                    name: "b.xlsx".into(),
                    rows: 1,
                    columns: 1,
                },
            ],
            total_rows: 2,
        };
        assert_eq!(
            manual_time_estimate(&intent, Some(&gathered)),
            MANUAL_PLANNING_MS + 2 * MANUAL_PER_SOURCE_FILE_MS
        );
    }

    #[test]
    fn no_flags_estimate_is_planning_only() {
        let intent = intent_for("hello there");
        assert_eq!(manual_time_estimate(&intent, None), MANUAL_PLANNING_MS);
    }

    #[test]
    fn full_intent_sums_every_constant() {
        let intent = intent_for(
            "merge the excel budget, write a word report, build a powerpoint, \
             email finance, and schedule a meeting",
        );
        let gathered = GatheredData::default();
        assert_eq!(
            manual_time_estimate(&intent, Some(&gathered)),
            MANUAL_PLANNING_MS
                + MANUAL_DOCUMENT_MS
                + MANUAL_DECK_MS
                + MANUAL_MAIL_MS
                + MANUAL_MEETING_MS
        );
    }
}
