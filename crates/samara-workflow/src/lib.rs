//! Workflow cores for the Samara assistant.
//!
//! This crate provides the two control-flow cores behind the assistant:
//!
//! - **Intent pipeline**: keyword classification of a free-text prompt
//!   via [`classifier::IntentClassifier`], then a fixed, flag-gated,
//!   sequential pipeline of remote operations via
//!   [`runner::WorkflowRunner`], with per-stage progress reports and a
//!   time-saved estimate.
//! - **Approval gate**: a single-frontier, human-gated step machine via
//!   [`gate::StepGate`] — every step advances only on an explicit
//!   approval.
//!
//! The two cores are independent; an application composes them at its
//! own layer.  Remote I/O goes through the
//! [`samara_graph::OfficeService`] seam.

pub mod classifier;
pub mod compliance;
pub mod content;
pub mod error;
pub mod gate;
pub mod runner;

pub use classifier::{ActionFlags, Intent, IntentClassifier};
pub use compliance::{ComplianceCategory, ComplianceEvent, ComplianceLog};
pub use error::{Result, WorkflowError};
pub use gate::{Analysis, GateStatus, Issue, OwnerApp, Severity, Step, StepGate, StepStatus};
pub use runner::{
    GatheredData, SourceFileSummary, StepPhase, StepReport, WorkflowRunResult, WorkflowRunner,
};
