use crate::{
    model::CheckStatus,
    time::{now_ms, EpochMs},
    types::{CheckOutcome, Defect, Report, TestSummary},
};

/// `passed / total` as a one-decimal percentage; `0%` for an empty run.
pub fn pass_rate(passed: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", passed as f64 / total as f64 * 100.0)
}

pub fn summarize(results: &[CheckOutcome]) -> TestSummary {
    let count = |s: CheckStatus| results.iter().filter(|r| r.status == s).count();
    let passed = count(CheckStatus::Passed);
    TestSummary {
        total: results.len(),
        passed,
        failed: count(CheckStatus::Failed),
        errors: count(CheckStatus::Error),
        pass_rate: pass_rate(passed, results.len()),
    }
}

/// Build a report stamped with the current time.
pub fn generate(results: &[CheckOutcome], defects: &[Defect]) -> Report {
    generate_at(results, defects, now_ms())
}

pub fn generate_at(
    results: &[CheckOutcome],
    defects: &[Defect],
    generated_at_ms: EpochMs,
) -> Report {
    Report {
        run_id: None,
        test_summary: summarize(results),
        test_results: results.to_vec(),
        defects_found: defects.len(),
        defect_details: defects.to_vec(),
        generated_at_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckKind;

    fn outcome(status: CheckStatus) -> CheckOutcome {
        CheckOutcome {
            test_name: CheckKind::Status.test_name("d1"),
            check: CheckKind::Status,
            device: "d1".into(),
            status,
            issues: vec![],
            details: None,
            error: None,
            duration_ms: 1.0,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn empty_run_has_zero_percent() {
        assert_eq!(pass_rate(0, 0), "0%");
        let s = summarize(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.pass_rate, "0%");
    }

    #[test]
    fn pass_rate_rounds_to_one_decimal() {
        assert_eq!(pass_rate(2, 3), "66.7%");
        assert_eq!(pass_rate(1, 3), "33.3%");
        assert_eq!(pass_rate(8, 8), "100.0%");
        assert_eq!(pass_rate(0, 5), "0.0%");
    }

    #[test]
    fn summary_counts_each_status() {
        let results = vec![
            outcome(CheckStatus::Passed),
            outcome(CheckStatus::Failed),
            outcome(CheckStatus::Error),
            outcome(CheckStatus::Passed),
        ];
        let s = summarize(&results);
        assert_eq!((s.total, s.passed, s.failed, s.errors), (4, 2, 1, 1));
        assert_eq!(s.pass_rate, "50.0%");
    }

    #[test]
    fn generation_only_differs_by_timestamp() {
        let results = vec![outcome(CheckStatus::Passed), outcome(CheckStatus::Failed)];
        let a = generate_at(&results, &[], 1);
        let b = generate_at(&results, &[], 2);
        assert_ne!(a, b);
        assert_eq!(
            Report {
                generated_at_ms: 1,
                ..b
            },
            a
        );
    }
}
