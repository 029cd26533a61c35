//! In-memory audit trail of externally-visible operations.
//!
//! The runner records one event per data access, file creation, message,
//! and calendar write it performs, so a run can be reviewed after the
//! fact.  The log is append-only and owned by the runner; it is not
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What kind of externally-visible operation an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceCategory {
    /// Reading user data (file listings, cell ranges).
    DataAccess,
    /// Creating or writing files.
    FileCreation,
    /// Sending messages on the user's behalf.
    Communication,
    /// Writing to the user's calendar.
    Scheduling,
}

impl std::fmt::Display for ComplianceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataAccess => write!(f, "data_access"),
            Self::FileCreation => write!(f, "file_creation"),
            Self::Communication => write!(f, "communication"),
            Self::Scheduling => write!(f, "scheduling"),
        }
    }
}

/// One audited operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEvent {
    /// When the operation happened.
    pub at: DateTime<Utc>,
    pub category: ComplianceCategory,
    /// What was done (e.g. "read worksheet range").
    pub action: String,
    /// What it was done to (file name, recipient address, event subject).
    pub subject: String,
}

/// Append-only audit log for a single runner.
#[derive(Debug, Default)]
pub struct ComplianceLog {
    events: Vec<ComplianceEvent>,
}

impl ComplianceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one operation.
    pub fn record(
        &mut self,
        category: ComplianceCategory,
        action: impl Into<String>,
        subject: impl Into<String>,
    ) {
        let event = ComplianceEvent {
            at: Utc::now(),
            category,
            action: action.into(),
            subject: subject.into(),
        };
        debug!(
            category = %event.category,
            action = %event.action,
            subject = %event.subject,
            "compliance event"
        );
        self.events.push(event);
    }

    /// All events in recording order.
    pub fn events(&self) -> &[ComplianceEvent] {
        &self.events
    }

    /// Events of one category, in recording order.
    pub fn by_category(&self, category: ComplianceCategory) -> Vec<&ComplianceEvent> {
        self.events
            .iter()
            .filter(|event| event.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut log = ComplianceLog::new();
        log.record(ComplianceCategory::DataAccess, "read range", "Budget.xlsx");
        log.record(
            ComplianceCategory::Communication,
            "send mail",
            "finance@company.com",
        );

        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].subject, "Budget.xlsx");
        assert_eq!(log.events()[1].category, ComplianceCategory::Communication);
    }

    #[test]
    fn filters_by_category() {
        let mut log = ComplianceLog::new();
        log.record(ComplianceCategory::DataAccess, "list files", "drive root");
        log.record(ComplianceCategory::FileCreation, "create file", "Report.docx");
        log.record(ComplianceCategory::DataAccess, "read range", "Q3.xlsx");

        let reads = log.by_category(ComplianceCategory::DataAccess);
        assert_eq!(reads.len(), 2);
        assert!(log.by_category(ComplianceCategory::Scheduling).is_empty());
    }
}
