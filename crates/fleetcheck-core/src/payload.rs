use serde::{Deserialize, Serialize};

/// Reachability probe result for a device's management address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConnectivityProbe {
    pub reachable: bool,
    pub response_time_ms: f64,
    pub port_open: bool,
}

/// System metrics reported by the device.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SystemStatus {
    pub status: String,
    pub uptime: String,
    pub cpu_usage_pct: f64,
    pub memory_usage_pct: f64,
    pub temperature_c: f64,
    pub interfaces_up: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    /// Link state as reported by the device (`up`, `down`, `testing`, ...).
    pub status: String,
    pub speed: String,
    pub duplex: String,
}

impl InterfaceInfo {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmRecord {
    pub severity: String,
    pub message: String,
    pub timestamp: String,
}

/// Raw adapter data retained on a check outcome, one variant per check kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum CheckDetails {
    Connectivity(ConnectivityProbe),
    Status(SystemStatus),
    Interfaces {
        interfaces: Vec<InterfaceInfo>,
    },
    Alarms {
        active_alarms: Vec<AlarmRecord>,
        alarm_count: usize,
    },
}

impl CheckDetails {
    pub fn alarms(active_alarms: Vec<AlarmRecord>) -> Self {
        let alarm_count = active_alarms.len();
        CheckDetails::Alarms {
            active_alarms,
            alarm_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_carry_a_check_tag() {
        let d = CheckDetails::alarms(vec![AlarmRecord {
            severity: "minor".into(),
            message: "Interface eth3 down".into(),
            timestamp: "2025-09-26T10:30:00Z".into(),
        }]);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["check"], "alarms");
        assert_eq!(v["alarm_count"], 1);
        assert_eq!(v["active_alarms"][0]["message"], "Interface eth3 down");
    }

    #[test]
    fn only_literal_up_counts_as_up() {
        let mut iface = InterfaceInfo {
            name: "eth0".into(),
            status: "up".into(),
            speed: "10Gbps".into(),
            duplex: "full".into(),
        };
        assert!(iface.is_up());
        iface.status = "UP".into();
        assert!(!iface.is_up());
    }
}
