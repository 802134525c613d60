use serde::{Deserialize, Serialize};

use crate::{
    model::CheckStatus,
    payload::{AlarmRecord, ConnectivityProbe, InterfaceInfo, SystemStatus},
};

pub const CONNECTIVITY_FAILED: &str = "Connectivity failed - device unreachable";
pub const DEVICE_NOT_FOUND: &str = "Device configuration not found";

/// Upper bounds for the status check. A metric fails only when strictly above its bound.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusThresholds {
    pub cpu_usage_pct: f64,
    pub memory_usage_pct: f64,
    pub temperature_c: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            cpu_usage_pct: 80.0,
            memory_usage_pct: 90.0,
            temperature_c: 60.0,
        }
    }
}

/// Verdict of a check over data the adapter returned successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub status: CheckStatus,
    pub issues: Vec<String>,
}

impl Evaluation {
    pub fn from_issues(issues: Vec<String>) -> Self {
        let status = if issues.is_empty() {
            CheckStatus::Passed
        } else {
            CheckStatus::Failed
        };
        Self { status, issues }
    }

    pub fn passed() -> Self {
        Self::from_issues(vec![])
    }
}

pub fn evaluate_connectivity(probe: &ConnectivityProbe) -> Evaluation {
    if probe.response_time_ms > 0.0 && probe.port_open {
        Evaluation::passed()
    } else {
        Evaluation::from_issues(vec![CONNECTIVITY_FAILED.to_string()])
    }
}

pub fn evaluate_status(status: &SystemStatus, thresholds: &StatusThresholds) -> Evaluation {
    let mut issues = Vec::new();
    if status.cpu_usage_pct > thresholds.cpu_usage_pct {
        issues.push(format!(
            "High CPU usage: {}%",
            metric(status.cpu_usage_pct)
        ));
    }
    if status.memory_usage_pct > thresholds.memory_usage_pct {
        issues.push(format!(
            "High memory usage: {}%",
            metric(status.memory_usage_pct)
        ));
    }
    if status.temperature_c > thresholds.temperature_c {
        issues.push(format!(
            "High temperature: {}°C",
            metric(status.temperature_c)
        ));
    }
    Evaluation::from_issues(issues)
}

pub fn evaluate_interfaces(interfaces: &[InterfaceInfo], expected: usize) -> Evaluation {
    let mut issues = Vec::new();
    if interfaces.len() != expected {
        issues.push(format!(
            "Expected {} interfaces, found {}",
            expected,
            interfaces.len()
        ));
    }
    for iface in interfaces.iter().filter(|i| !i.is_up()) {
        issues.push(format!("Interface {} is {}", iface.name, iface.status));
    }
    Evaluation::from_issues(issues)
}

/// Alarms are monitored, never gated on.
pub fn evaluate_alarms(_alarms: &[AlarmRecord]) -> Evaluation {
    Evaluation::passed()
}

// Whole readings keep one decimal, e.g. `85.0`.
fn metric(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
