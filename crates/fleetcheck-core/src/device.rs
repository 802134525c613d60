use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One managed network element under test.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// Unique registry key.
    pub name: String,
    pub address: String,
    pub device_type: String,
    pub management_port: u16,
    /// Interface count the interface check expects the device to report.
    pub expected_interfaces: usize,
    pub protocols: BTreeSet<String>,
}

impl Device {
    pub fn supports(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p.eq_ignore_ascii_case(protocol))
    }
}

fn protocols(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|p| p.to_string()).collect()
}

/// Devices used when no (valid) device configuration is supplied.
pub fn builtin_devices() -> Vec<Device> {
    vec![
        Device {
            name: "optical_device_1".into(),
            address: "192.168.1.100".into(),
            device_type: "optical_transponder".into(),
            management_port: 8080,
            expected_interfaces: 4,
            protocols: protocols(&["REST", "SNMP", "CLI"]),
        },
        Device {
            name: "microwave_device_1".into(),
            address: "192.168.1.101".into(),
            device_type: "microwave_radio".into(),
            management_port: 443,
            expected_interfaces: 2,
            protocols: protocols(&["REST", "NETCONF"]),
        },
    ]
}
