use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use fleetcheck_core::{CheckDetails, CheckStatus, Report};

/// Write `report` as pretty JSON, creating parent directories as needed.
pub fn save_report(path: &Path, report: &Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let bytes = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, bytes).with_context(|| format!("write report {}", path.display()))?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<Report> {
    let bytes = std::fs::read(path).with_context(|| format!("read report {}", path.display()))?;
    let report = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse report {}", path.display()))?;
    Ok(report)
}

/// Human-readable summary: totals, one line per check, then every defect.
pub fn render_text(report: &Report) -> String {
    let s = &report.test_summary;
    let mut out = String::new();
    let _ = writeln!(out, "=== TEST RESULTS SUMMARY ===");
    if let Some(run_id) = &report.run_id {
        let _ = writeln!(out, "Run: {}", run_id.as_str());
    }
    let _ = writeln!(out, "Total Tests: {}", s.total);
    let _ = writeln!(out, "Passed: {}", s.passed);
    let _ = writeln!(out, "Failed: {}", s.failed);
    let _ = writeln!(out, "Errors: {}", s.errors);
    let _ = writeln!(out, "Pass Rate: {}", s.pass_rate);

    if !report.test_results.is_empty() {
        let _ = writeln!(out, "\n=== CHECKS ===");
    }
    for r in &report.test_results {
        let note = match (r.status, &r.details) {
            (CheckStatus::Error, _) => r.error.clone().unwrap_or_default(),
            (CheckStatus::Failed, _) => r.issues.join("; "),
            (CheckStatus::Passed, Some(details)) => describe(details),
            (CheckStatus::Passed, None) => String::new(),
        };
        let _ = writeln!(out, "{:<8} {:<45} {}", r.status.to_string(), r.test_name, note);
    }

    let _ = writeln!(out, "\nDefects Found: {}", report.defects_found);
    if !report.defect_details.is_empty() {
        let _ = writeln!(out, "\n=== DEFECT DETAILS ===");
        for d in &report.defect_details {
            let _ = writeln!(
                out,
                "ID: {} | Severity: {} | Device: {}",
                d.defect_id, d.severity, d.device
            );
            let _ = writeln!(out, "Description: {}", d.description);
        }
    }
    out
}

fn describe(details: &CheckDetails) -> String {
    match details {
        CheckDetails::Connectivity(p) => format!("{:.1} ms", p.response_time_ms),
        CheckDetails::Status(s) => format!(
            "cpu {}% mem {}% temp {}°C up {}",
            s.cpu_usage_pct, s.memory_usage_pct, s.temperature_c, s.uptime
        ),
        CheckDetails::Interfaces { interfaces } => {
            let up = interfaces.iter().filter(|i| i.is_up()).count();
            format!("{up}/{} up", interfaces.len())
        }
        CheckDetails::Alarms { alarm_count, .. } => format!("{alarm_count} active alarm(s)"),
    }
}
