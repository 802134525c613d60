use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fleetcheck_core::{builtin_devices, Device};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Where the registry's devices came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrySource {
    Builtin,
    File(PathBuf),
}

/// One device as written in a configuration file. Both the camelCase keys and the
/// older snake_case spellings are accepted.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceEntry {
    #[serde(alias = "ip")]
    address: String,
    #[serde(alias = "type", alias = "device_type")]
    device_type: String,
    #[serde(alias = "management_port")]
    management_port: u16,
    #[serde(alias = "expected_interfaces")]
    expected_interfaces: usize,
    #[serde(default)]
    protocols: BTreeSet<String>,
}

impl DeviceEntry {
    fn into_device(self, name: String) -> Device {
        Device {
            name,
            address: self.address,
            device_type: self.device_type,
            management_port: self.management_port,
            expected_interfaces: self.expected_interfaces,
            protocols: self.protocols,
        }
    }
}

/// Device map that keeps file order.
struct DeviceMap(Vec<(String, DeviceEntry)>);

impl<'de> Deserialize<'de> for DeviceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = DeviceMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of device name to device settings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DeviceMap, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, DeviceEntry>()? {
                    entries.push((name, entry));
                }
                Ok(DeviceMap(entries))
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

/// Immutable name -> device lookup, iterated in registration order.
#[derive(Clone, Debug)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    index: HashMap<String, usize>,
    source: RegistrySource,
}

impl DeviceRegistry {
    pub fn builtin() -> Self {
        Self::from_devices(builtin_devices(), RegistrySource::Builtin)
    }

    /// Later duplicates of a name are dropped.
    pub fn from_devices(devices: Vec<Device>, source: RegistrySource) -> Self {
        let mut kept = Vec::with_capacity(devices.len());
        let mut index = HashMap::new();
        for device in devices {
            if index.contains_key(&device.name) {
                warn!(device = %device.name, "duplicate device name ignored");
                continue;
            }
            index.insert(device.name.clone(), kept.len());
            kept.push(device);
        }
        Self {
            devices: kept,
            index,
            source,
        }
    }

    /// Load a JSON or YAML device file. Never fails: a missing, unreadable, malformed or
    /// empty file leaves the built-in devices in place.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(reg) => reg,
            Err(e) => {
                warn!(path = %path.display(), "using built-in devices: {e:#}");
                Self::builtin()
            }
        }
    }

    /// Like [`DeviceRegistry::load`] but reports why the file was rejected.
    pub fn try_load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let devices = if is_yaml(path) {
            parse_yaml(&text)
        } else {
            parse_json(&text)
        }
        .with_context(|| format!("parse {}", path.display()))?;
        if devices.is_empty() {
            bail!("{} defines no devices", path.display());
        }
        Ok(Self::from_devices(devices, RegistrySource::File(path.to_path_buf())))
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.index.get(name).map(|&i| &self.devices[i])
    }

    pub fn names(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.name.clone()).collect()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn source(&self) -> &RegistrySource {
        &self.source
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn parse_json(text: &str) -> Result<Vec<Device>> {
    let map: DeviceMap = serde_json::from_str(text)?;
    Ok(into_devices(map))
}

pub fn parse_yaml(text: &str) -> Result<Vec<Device>> {
    let map: DeviceMap = serde_yaml::from_str(text)?;
    Ok(into_devices(map))
}

fn into_devices(map: DeviceMap) -> Vec<Device> {
    map.0
        .into_iter()
        .map(|(name, entry)| entry.into_device(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_DEVICES: &str = r#"{
        "zeta_radio": {"address": "10.0.0.3", "deviceType": "microwave_radio",
                       "managementPort": 443, "expectedInterfaces": 2, "protocols": ["NETCONF"]},
        "alpha_olt":  {"ip": "10.0.0.1", "type": "optical_transponder",
                       "management_port": 8080, "expected_interfaces": 8},
        "mid_switch": {"address": "10.0.0.2", "device_type": "switch",
                       "managementPort": 22, "expectedInterfaces": 48, "protocols": ["CLI", "SNMP"]}
    }"#;

    #[test]
    fn builtin_registry_lookup() {
        let reg = DeviceRegistry::builtin();
        assert_eq!(reg.names(), vec!["optical_device_1", "microwave_device_1"]);
        assert_eq!(reg.get("microwave_device_1").map(|d| d.expected_interfaces), Some(2));
        assert!(reg.get("nope").is_none());
        assert_eq!(reg.source(), &RegistrySource::Builtin);
    }

    #[test]
    fn json_keeps_file_order_and_accepts_old_keys() {
        let devices = parse_json(THREE_DEVICES).unwrap();
        let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta_radio", "alpha_olt", "mid_switch"]);
        assert_eq!(devices[1].address, "10.0.0.1");
        assert_eq!(devices[1].device_type, "optical_transponder");
        assert_eq!(devices[1].expected_interfaces, 8);
        assert!(devices[1].protocols.is_empty());
        assert!(devices[2].supports("snmp"));
    }

    #[test]
    fn yaml_files_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.yaml");
        std::fs::write(
            &path,
            "edge_1:
  address: 10.1.0.1
  deviceType: optical_transponder
  managementPort: 830
  expectedInterfaces: 4
  protocols: [NETCONF]
",
        )
        .unwrap();
        let reg = DeviceRegistry::load(&path);
        assert_eq!(reg.names(), vec!["edge_1"]);
        assert_eq!(reg.get("edge_1").map(|d| d.management_port), Some(830));
        assert_eq!(reg.source(), &RegistrySource::File(path));
    }

    #[test]
    fn bad_sources_fall_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();

        let missing = DeviceRegistry::load(&dir.path().join("absent.json"));
        assert_eq!(missing.source(), &RegistrySource::Builtin);

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ not json").unwrap();
        assert_eq!(DeviceRegistry::load(&garbled).len(), 2);

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "{}").unwrap();
        let reg = DeviceRegistry::load(&empty);
        assert_eq!(reg.source(), &RegistrySource::Builtin);
        assert!(DeviceRegistry::try_load(&empty).is_err());
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let mut devices = builtin_devices();
        let mut dup = devices[0].clone();
        dup.address = "10.9.9.9".into();
        devices.push(dup);
        let reg = DeviceRegistry::from_devices(devices, RegistrySource::Builtin);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("optical_device_1").map(|d| d.address.as_str()), Some("192.168.1.100"));
    }
}
