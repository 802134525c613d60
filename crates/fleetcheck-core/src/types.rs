use serde::{Deserialize, Serialize};

use crate::{ids::*, model::*, payload::CheckDetails, time::EpochMs};

/// Result of running one check against one device.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub test_name: String,
    pub check: CheckKind,
    pub device: String,
    pub status: CheckStatus,
    /// Policy violations found, in evaluation order. Empty unless `status` is FAILED.
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CheckDetails>,
    /// Why the check could not complete. Only set when `status` is ERROR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: f64,
    pub timestamp_ms: EpochMs,
}

impl CheckOutcome {
    /// Outcome for a check that could not complete.
    pub fn error(
        check: CheckKind,
        device: &str,
        error: impl Into<String>,
        duration_ms: f64,
        timestamp_ms: EpochMs,
    ) -> Self {
        Self {
            test_name: check.test_name(device),
            check,
            device: device.to_string(),
            status: CheckStatus::Error,
            issues: vec![],
            details: None,
            error: Some(error.into()),
            duration_ms,
            timestamp_ms,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub defect_id: DefectId,
    pub device: String,
    pub category: DefectCategory,
    pub description: String,
    pub severity: Severity,
    pub status: DefectStatus,
    pub assigned_to: String,
    pub created_at_ms: EpochMs,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    /// Percentage with one decimal place, or `0%` for an empty run.
    pub pass_rate: String,
}

/// Derived view over a run's outcomes and defects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub test_summary: TestSummary,
    pub test_results: Vec<CheckOutcome>,
    pub defects_found: usize,
    pub defect_details: Vec<Defect>,
    #[serde(rename = "reportGeneratedAt")]
    pub generated_at_ms: EpochMs,
}

impl Report {
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }
}
