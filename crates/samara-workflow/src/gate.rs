//! Human-gated step progression.
//!
//! A [`StepGate`] holds a fixed, ordered list of steps and advances a
//! single frontier through them: at any moment while the gate is active,
//! exactly one step is awaiting approval, every step before it is
//! completed, and every step after it is pending.  Progression happens
//! only through explicit [`StepGate::approve`] calls — the gate never
//! advances on its own.
//!
//! Elapsed time is derived from [`tokio::time::Instant`] rather than a
//! background tick task, so there is nothing to leak when the gate
//! leaves the active state and paused-clock tests run without real
//! waits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Result, WorkflowError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The application a step acts on, for attribution in renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerApp {
    /// Spreadsheet workloads.
    Excel,
    /// Document libraries and compliance sources.
    SharePoint,
    /// Messaging and notifications.
    Teams,
    /// Samara's own analysis engine.
    Assistant,
}

impl std::fmt::Display for OwnerApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excel => write!(f, "excel"),
            Self::SharePoint => write!(f, "sharepoint"),
            Self::Teams => write!(f, "teams"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Severity of an issue surfaced by pre-run analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    Info,
}

/// A single finding attached to a step's analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// The entity the issue concerns (e.g. a driver name), when known.
    #[serde(default)]
    pub subject: Option<String>,
}

/// Pre-run analysis attached to a step at construction time.
///
/// Read-only once attached; never mutated during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub issues: Vec<Issue>,
    pub summary: String,
}

/// The tri-state lifecycle of an individual step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet reached by the frontier.
    Pending,
    /// The frontier step, blocked on human approval.
    WaitingApproval,
    /// Approved and finished.
    Completed,
}

/// One element of the gate's ordered step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique key used to address the step in approvals.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// The application this step acts on.
    pub owner_app: OwnerApp,
    /// Current lifecycle status.
    pub status: StepStatus,
    /// Source file the step reads, when applicable.
    #[serde(default)]
    pub source_file: Option<String>,
    /// What the step does, phrased for the person approving it.
    pub action: String,
    /// Extra context shown in expanded views.
    #[serde(default)]
    pub details: Option<String>,
    /// Whole seconds the step spent awaiting approval.  Assigned exactly
    /// once, at the transition to [`StepStatus::Completed`].
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Pre-run analysis, attached at construction time.
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl Step {
    /// Create a pending step.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        owner_app: OwnerApp,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            owner_app,
            status: StepStatus::Pending,
            source_file: None,
            action: action.into(),
            details: None,
            duration_secs: None,
            analysis: None,
        }
    }

    /// Attach the source file this step reads.
    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    /// Attach extra context for expanded views.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach pre-run analysis.
    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// The gate-level state machine: `Idle → Active → Complete`, with
/// `reset()` returning to `Idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Idle,
    Active,
    Complete,
}

// ---------------------------------------------------------------------------
// StepGate
// ---------------------------------------------------------------------------

/// Single-frontier, human-gated step progression with elapsed-time
/// tracking.
///
/// The step list is constructed once and mutated in place as approvals
/// arrive; `reset()` is the only way back, and it is destructive.
pub struct StepGate {
    steps: Vec<Step>,
    status: GateStatus,
    /// When the current run started; `None` outside `Active`.
    started_at: Option<Instant>,
    /// When the frontier step entered `WaitingApproval`.
    frontier_since: Option<Instant>,
    /// Total run time, frozen when the gate completes.
    final_elapsed: Duration,
}

impl StepGate {
    /// Create an idle gate over the given ordered step list.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            status: GateStatus::Idle,
            started_at: None,
            frontier_since: None,
            final_elapsed: Duration::ZERO,
        }
    }

    // -- Operations ---------------------------------------------------------

    /// Activate the gate: start the clock and open the first step for
    /// approval.
    ///
    /// Fails if the gate is not idle or has no steps.
    pub fn start(&mut self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(WorkflowError::EmptyGate);
        }
        if self.status != GateStatus::Idle {
            return Err(WorkflowError::GateActive);
        }

        let now = Instant::now();
        self.status = GateStatus::Active;
        self.started_at = Some(now);
        self.frontier_since = Some(now);
        self.steps[0].status = StepStatus::WaitingApproval;

        info!(steps = self.steps.len(), "gate activated");
        Ok(())
    }

    /// Approve the step currently awaiting approval.
    ///
    /// Completes the step, records how long it waited, and opens the next
    /// step — or completes the whole gate if this was the last one.
    /// Approving any step not in `WaitingApproval` is a hard error and
    /// leaves the gate untouched.
    pub fn approve(&mut self, step_id: &str) -> Result<()> {
        let index = self
            .steps
            .iter()
            .position(|step| step.id == step_id)
            .ok_or_else(|| WorkflowError::UnknownStep {
                step_id: step_id.to_string(),
            })?;

        let status = self.steps[index].status;
        if status != StepStatus::WaitingApproval {
            return Err(WorkflowError::InvalidTransition {
                step_id: step_id.to_string(),
                status,
            });
        }

        let now = Instant::now();
        let waited = self
            .frontier_since
            .map_or(Duration::ZERO, |since| now.duration_since(since));
        self.steps[index].status = StepStatus::Completed;
        self.steps[index].duration_secs = Some(waited.as_secs());

        debug!(
            step = step_id,
            waited_secs = waited.as_secs(),
            "step approved"
        );

        if index + 1 < self.steps.len() {
            self.steps[index + 1].status = StepStatus::WaitingApproval;
            self.frontier_since = Some(now);
        } else {
            self.final_elapsed = self
                .started_at
                .map_or(Duration::ZERO, |start| now.duration_since(start));
            self.status = GateStatus::Complete;
            self.started_at = None;
            self.frontier_since = None;
            info!(
                elapsed_secs = self.final_elapsed.as_secs(),
                "gate complete"
            );
        }

        Ok(())
    }

    /// Return every step to pending, clear durations, and zero the clock.
    ///
    /// Valid from any state; in-progress approvals are lost.
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
            step.duration_secs = None;
        }
        self.status = GateStatus::Idle;
        self.started_at = None;
        self.frontier_since = None;
        self.final_elapsed = Duration::ZERO;
        info!("gate reset");
    }

    // -- Accessors ----------------------------------------------------------

    /// The gate-level status.
    pub fn status(&self) -> GateStatus {
        self.status
    }

    /// The ordered step list.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The step currently awaiting approval, if the gate is active.
    pub fn frontier(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::WaitingApproval)
    }

    /// Wall-clock time the gate has been running: zero while idle, live
    /// while active, frozen once complete.
    pub fn elapsed(&self) -> Duration {
        match self.status {
            GateStatus::Idle => Duration::ZERO,
            GateStatus::Active => self
                .started_at
                .map_or(Duration::ZERO, |start| start.elapsed()),
            GateStatus::Complete => self.final_elapsed,
        }
    }

    /// Convenience accessor for renderings that show whole seconds.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_gate(n: usize) -> StepGate {
        let steps = (0..n)
            .map(|i| {
                Step::new(
                    format!("step-{i}"),
                    format!("Step {i}"),
                    OwnerApp::Excel,
                    "do the thing",
                )
            })
            .collect();
        StepGate::new(steps)
    }

    /// Exactly one frontier step while active, with completed steps
    /// before it and pending steps after it.
    fn assert_single_frontier(gate: &StepGate) {
        let steps = gate.steps();
        let waiting: Vec<usize> = steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == StepStatus::WaitingApproval)
            .map(|(i, _)| i)
            .collect();

        match gate.status() {
            GateStatus::Active => {
                assert_eq!(waiting.len(), 1, "exactly one step awaiting approval");
                let frontier = waiting[0];
                assert!(
                    steps[..frontier]
                        .iter()
                        .all(|s| s.status == StepStatus::Completed)
                );
                assert!(
                    steps[frontier + 1..]
                        .iter()
                        .all(|s| s.status == StepStatus::Pending)
                );
            }
            GateStatus::Idle | GateStatus::Complete => assert!(waiting.is_empty()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn frontier_invariant_holds_through_full_run() {
        let mut gate = sample_gate(4);
        assert_single_frontier(&gate);

        gate.start().unwrap();
        assert_single_frontier(&gate);

        for i in 0..4 {
            gate.approve(&format!("step-{i}")).unwrap();
            assert_single_frontier(&gate);
        }
        assert_eq!(gate.status(), GateStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn completes_exactly_after_last_approval() {
        let mut gate = sample_gate(3);
        gate.start().unwrap();

        gate.approve("step-0").unwrap();
        assert_eq!(gate.status(), GateStatus::Active);
        gate.approve("step-1").unwrap();
        assert_eq!(gate.status(), GateStatus::Active);
        gate.approve("step-2").unwrap();
        assert_eq!(gate.status(), GateStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_idle_from_any_state() {
        // From idle.
        let mut gate = sample_gate(2);
        gate.reset();
        assert_eq!(gate.status(), GateStatus::Idle);

        // From active, mid-run.
        gate.start().unwrap();
        gate.approve("step-0").unwrap();
        gate.reset();
        assert_eq!(gate.status(), GateStatus::Idle);
        assert_eq!(gate.elapsed_secs(), 0);
        assert!(
            gate.steps()
                .iter()
                .all(|s| s.status == StepStatus::Pending && s.duration_secs.is_none())
        );

        // From complete.
        gate.start().unwrap();
        gate.approve("step-0").unwrap();
        gate.approve("step-1").unwrap();
        assert_eq!(gate.status(), GateStatus::Complete);
        gate.reset();
        assert_eq!(gate.status(), GateStatus::Idle);
        assert_eq!(gate.elapsed_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn approving_ineligible_step_is_rejected_without_corruption() {
        let mut gate = sample_gate(3);
        gate.start().unwrap();

        // Pending step.
        let err = gate.approve("step-2").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_single_frontier(&gate);

        // Completed step.
        gate.approve("step-0").unwrap();
        let err = gate.approve("step-0").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_single_frontier(&gate);

        // Unknown step.
        let err = gate.approve("nope").unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownStep { .. }));
        assert_single_frontier(&gate);
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_idle_and_nonempty() {
        let mut empty = StepGate::new(Vec::new());
        assert!(matches!(empty.start(), Err(WorkflowError::EmptyGate)));

        let mut gate = sample_gate(2);
        gate.start().unwrap();
        assert!(matches!(gate.start(), Err(WorkflowError::GateActive)));
    }

    #[tokio::test(start_paused = true)]
    async fn durations_measure_time_awaiting_approval() {
        let mut gate = sample_gate(2);
        gate.start().unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        gate.approve("step-0").unwrap();
        assert_eq!(gate.steps()[0].duration_secs, Some(4));

        tokio::time::advance(Duration::from_secs(7)).await;
        gate.approve("step-1").unwrap();
        assert_eq!(gate.steps()[1].duration_secs, Some(7));

        // Elapsed is frozen at completion.
        assert_eq!(gate.elapsed_secs(), 11);
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(gate.elapsed_secs(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_runs_while_active() {
        let mut gate = sample_gate(2);
        assert_eq!(gate.elapsed_secs(), 0);

        gate.start().unwrap();
        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(gate.elapsed_secs(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_is_preserved_across_runs() {
        let analysis = Analysis {
            issues: vec![Issue {
                severity: Severity::Warning,
                title: "Driving hours exceeded".into(),
                description: "11h scheduled against a 10h limit".into(),
                subject: Some("M. Thompson".into()),
            }],
            summary: "1 compliance issue identified".into(),
        };
        let step = Step::new("check", "Compliance check", OwnerApp::SharePoint, "validate")
            .with_source_file("Compliance_Framework_2024.docx")
            .with_analysis(analysis);

        let mut gate = StepGate::new(vec![step]);
        gate.start().unwrap();
        gate.approve("check").unwrap();
        gate.reset();

        let step = &gate.steps()[0];
        assert!(step.analysis.is_some());
        assert_eq!(step.analysis.as_ref().unwrap().issues.len(), 1);
        assert!(step.duration_secs.is_none());
    }
}
