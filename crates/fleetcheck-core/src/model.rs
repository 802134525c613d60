use std::fmt;

use serde::{Deserialize, Serialize};

/// The checks run against every device, in execution order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Connectivity,
    Status,
    Interface,
    Alarm,
}

impl CheckKind {
    /// Fixed per-device execution order.
    pub const ORDER: [CheckKind; 4] = [
        CheckKind::Connectivity,
        CheckKind::Status,
        CheckKind::Interface,
        CheckKind::Alarm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Connectivity => "connectivity",
            CheckKind::Status => "status",
            CheckKind::Interface => "interface",
            CheckKind::Alarm => "alarm",
        }
    }

    /// Report name of this check for one device, e.g. `status_test_optical_device_1`.
    pub fn test_name(&self, device: &str) -> String {
        format!("{}_test_{}", self.as_str(), device)
    }

    /// Category assigned to defects raised by this check.
    pub fn defect_category(&self) -> DefectCategory {
        match self {
            CheckKind::Connectivity => DefectCategory::Connectivity,
            CheckKind::Status => DefectCategory::Performance,
            CheckKind::Interface => DefectCategory::Interface,
            CheckKind::Alarm => DefectCategory::Alarm,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// Check ran and the device met policy.
    Passed,
    /// Check ran and the device violated policy. Always backed by defects.
    Failed,
    /// Check could not complete. Never backed by defects.
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Passed => write!(f, "PASSED"),
            CheckStatus::Failed => write!(f, "FAILED"),
            CheckStatus::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Major => write!(f, "MAJOR"),
            Severity::Minor => write!(f, "MINOR"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectStatus {
    Open,
}

/// Defect category. The set is open: unknown names round-trip through `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefectCategory {
    Connectivity,
    Performance,
    Interface,
    Alarm,
    Other(String),
}

impl DefectCategory {
    pub fn as_str(&self) -> &str {
        match self {
            DefectCategory::Connectivity => "connectivity",
            DefectCategory::Performance => "performance",
            DefectCategory::Interface => "interface",
            DefectCategory::Alarm => "alarm",
            DefectCategory::Other(name) => name,
        }
    }
}

impl From<String> for DefectCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "connectivity" => DefectCategory::Connectivity,
            "performance" => DefectCategory::Performance,
            "interface" => DefectCategory::Interface,
            "alarm" => DefectCategory::Alarm,
            _ => DefectCategory::Other(s),
        }
    }
}

impl From<&str> for DefectCategory {
    fn from(s: &str) -> Self {
        DefectCategory::from(s.to_string())
    }
}

impl From<DefectCategory> for String {
    fn from(c: DefectCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_run_in_fixed_order() {
        let names: Vec<_> = CheckKind::ORDER.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["connectivity", "status", "interface", "alarm"]);
    }

    #[test]
    fn test_names_follow_kind_and_device() {
        assert_eq!(
            CheckKind::Interface.test_name("optical_device_1"),
            "interface_test_optical_device_1"
        );
    }

    #[test]
    fn status_check_raises_performance_defects() {
        assert_eq!(CheckKind::Status.defect_category(), DefectCategory::Performance);
        assert_eq!(CheckKind::Connectivity.defect_category(), DefectCategory::Connectivity);
    }

    #[test]
    fn unknown_categories_are_kept() {
        let c = DefectCategory::from("optical_power");
        assert_eq!(c, DefectCategory::Other("optical_power".into()));
        assert_eq!(c.as_str(), "optical_power");
        assert_eq!(DefectCategory::from("interface"), DefectCategory::Interface);
    }

    #[test]
    fn statuses_serialize_upper_case() {
        assert_eq!(serde_json::to_string(&CheckStatus::Passed).unwrap(), "\"PASSED\"");
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(serde_json::to_string(&DefectStatus::Open).unwrap(), "\"OPEN\"");
        assert_eq!(
            serde_json::to_string(&DefectCategory::Other("power".into())).unwrap(),
            "\"power\""
        );
    }
}
