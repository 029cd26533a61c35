//! Workflow error types.
//!
//! Both control-flow cores surface errors through [`WorkflowError`].
//! Gate errors never corrupt gate state: a rejected operation leaves the
//! step list exactly as it was.

use crate::gate::StepStatus;

/// Unified error type for the workflow crate.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    // -- Gate errors ---------------------------------------------------------
    /// An approval was requested on a step that is not awaiting approval.
    #[error("step `{step_id}` is {status:?}, not awaiting approval")]
    InvalidTransition { step_id: String, status: StepStatus },

    /// The referenced step does not exist in the gate.
    #[error("unknown step: `{step_id}`")]
    UnknownStep { step_id: String },

    /// `start()` was called on a gate that is not idle.
    #[error("gate is not idle; reset() it first")]
    GateActive,

    /// The gate was constructed with no steps.
    #[error("gate has no steps")]
    EmptyGate,

    // -- Runner errors -------------------------------------------------------
    /// The prompt was empty or whitespace-only.
    #[error("empty workflow prompt")]
    EmptyPrompt,

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the graph client.
    #[error("graph error: {0}")]
    Graph(#[from] samara_graph::GraphError),
}

/// Convenience alias used throughout the workflow crate.
pub type Result<T> = std::result::Result<T, WorkflowError>;
