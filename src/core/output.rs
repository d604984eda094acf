//! Public output types for rigger command responses.
//!
//! Both engines (the job runner and the repository visitors) produce an
//! [`ExecutionReport`]: one ordered entry per executed unit, from which the
//! overall outcome is derived.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Report entries
// ============================================================================

/// Outcome of a single executed unit (a task step or a repo/remote/branch combination).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub unit: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReportEntry {
    pub fn new(unit: impl Into<String>, success: bool, detail: Option<String>) -> Self {
        Self {
            unit: unit.into(),
            success,
            detail,
        }
    }
}

/// Summary of report entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// ============================================================================
// Execution report
// ============================================================================

/// Append-only, ordered record of executed units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    entries: Vec<ReportEntry>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, unit: impl Into<String>, success: bool, detail: Option<String>) {
        self.entries.push(ReportEntry::new(unit, success, detail));
    }

    pub fn record_success(&mut self, unit: impl Into<String>, detail: Option<String>) {
        self.record(unit, true, detail);
    }

    pub fn record_failure(&mut self, unit: impl Into<String>, detail: impl Into<String>) {
        self.record(unit, false, Some(detail.into()));
    }

    /// Append every entry of `other`, preserving its order.
    pub fn absorb(&mut self, other: ExecutionReport) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff no entry failed. An empty report counts as success.
    pub fn succeeded(&self) -> bool {
        self.entries.iter().all(|entry| entry.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| !entry.success)
    }

    pub fn summary(&self) -> BulkSummary {
        let succeeded = self.entries.iter().filter(|entry| entry.success).count();
        BulkSummary {
            total: self.entries.len(),
            succeeded,
            failed: self.entries.len() - succeeded,
        }
    }

    /// Process exit code for this report: 0 when every unit succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

impl Serialize for ExecutionReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecutionReport", 3)?;
        state.serialize_field("success", &self.succeeded())?;
        state.serialize_field("results", &self.entries)?;
        state.serialize_field("summary", &self.summary())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_succeeds() {
        let report = ExecutionReport::new();
        assert!(report.succeeded());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary(), BulkSummary::default());
    }

    #[test]
    fn single_failure_fails_report() {
        let mut report = ExecutionReport::new();
        report.record_success("a", None);
        report.record_failure("b", "broken");
        report.record_success("c", None);

        assert!(!report.succeeded());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.summary(),
            BulkSummary {
                total: 3,
                succeeded: 2,
                failed: 1
            }
        );
        let failed: Vec<&str> = report.failures().map(|e| e.unit.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn absorb_preserves_order() {
        let mut first = ExecutionReport::new();
        first.record_success("one", None);
        let mut second = ExecutionReport::new();
        second.record_success("two", None);
        second.record_success("three", None);

        first.absorb(second);

        let units: Vec<&str> = first.entries().iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(units, vec!["one", "two", "three"]);
    }

    #[test]
    fn serializes_success_results_and_summary() {
        let mut report = ExecutionReport::new();
        report.record_failure("repo", "no remotes detected");

        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["results"][0]["unit"], "repo");
        assert_eq!(value["results"][0]["detail"], "no remotes detected");
        assert_eq!(value["summary"]["failed"], 1);
    }
}
