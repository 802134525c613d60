use async_trait::async_trait;
use fleetcheck_core::{AlarmRecord, ConnectivityProbe, Device, InterfaceInfo, SystemStatus};

use crate::error::AdapterResult;

/// Capability the check engine uses to read one device.
///
/// Implementations own the transport (REST, SNMP, CLI, NETCONF or a simulator). An `Err`
/// means the call did not complete and makes the calling check an ERROR, not a FAILED.
#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    async fn connectivity(&self, device: &Device) -> AdapterResult<ConnectivityProbe>;
    async fn system_status(&self, device: &Device) -> AdapterResult<SystemStatus>;
    async fn interfaces(&self, device: &Device) -> AdapterResult<Vec<InterfaceInfo>>;
    async fn alarms(&self, device: &Device) -> AdapterResult<Vec<AlarmRecord>>;
}
