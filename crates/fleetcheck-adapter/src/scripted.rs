use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fleetcheck_core::{
    AlarmRecord, CheckKind, ConnectivityProbe, Device, InterfaceInfo, SystemStatus,
};

use crate::{
    error::{AdapterError, AdapterResult},
    traits::DeviceAdapter,
};

/// Canned answers for one device.
#[derive(Clone, Debug)]
pub struct DeviceScript {
    pub connectivity: AdapterResult<ConnectivityProbe>,
    pub system_status: AdapterResult<SystemStatus>,
    pub interfaces: AdapterResult<Vec<InterfaceInfo>>,
    pub alarms: AdapterResult<Vec<AlarmRecord>>,
    /// Delay before every answer.
    pub delay: Duration,
}

impl DeviceScript {
    /// A device that passes every check with `interfaces` links up.
    pub fn healthy(interfaces: usize) -> Self {
        Self {
            connectivity: Ok(ConnectivityProbe {
                reachable: true,
                response_time_ms: 5.0,
                port_open: true,
            }),
            system_status: Ok(SystemStatus {
                status: "operational".into(),
                uptime: "10:00:00".into(),
                cpu_usage_pct: 20.0,
                memory_usage_pct: 40.0,
                temperature_c: 30.0,
                interfaces_up: interfaces,
            }),
            interfaces: Ok((0..interfaces)
                .map(|i| link(&format!("eth{i}"), "up"))
                .collect()),
            alarms: Ok(vec![]),
            delay: Duration::ZERO,
        }
    }

    pub fn with_connectivity(mut self, r: AdapterResult<ConnectivityProbe>) -> Self {
        self.connectivity = r;
        self
    }

    pub fn with_status(mut self, r: AdapterResult<SystemStatus>) -> Self {
        self.system_status = r;
        self
    }

    pub fn with_interfaces(mut self, r: AdapterResult<Vec<InterfaceInfo>>) -> Self {
        self.interfaces = r;
        self
    }

    pub fn with_alarms(mut self, r: AdapterResult<Vec<AlarmRecord>>) -> Self {
        self.alarms = r;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Mark one interface with a non-`up` state.
    pub fn with_link_state(mut self, name: &str, status: &str) -> Self {
        if let Ok(ifaces) = &mut self.interfaces {
            for iface in ifaces.iter_mut().filter(|i| i.name == name) {
                iface.status = status.to_string();
            }
        }
        self
    }
}

pub fn link(name: &str, status: &str) -> InterfaceInfo {
    InterfaceInfo {
        name: name.to_string(),
        status: status.to_string(),
        speed: "10Gbps".into(),
        duplex: "full".into(),
    }
}

/// In-memory adapter answering from per-device scripts. Devices without a script are
/// unreachable. Records every call so tests can assert ordering and parallelism.
#[derive(Default)]
pub struct ScriptedAdapter {
    scripts: HashMap<String, DeviceScript>,
    calls: Mutex<Vec<(String, CheckKind)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: impl Into<String>, script: DeviceScript) -> Self {
        self.scripts.insert(name.into(), script);
        self
    }

    /// Calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<(String, CheckKind)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls_for(&self, device: &str) -> Vec<CheckKind> {
        self.calls()
            .into_iter()
            .filter(|(d, _)| d == device)
            .map(|(_, k)| k)
            .collect()
    }

    /// Highest number of calls that were waiting on their delay at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn respond<T, F>(&self, device: &Device, kind: CheckKind, pick: F) -> AdapterResult<T>
    where
        T: Clone,
        F: Fn(&DeviceScript) -> &AdapterResult<T>,
    {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((device.name.clone(), kind));

        let Some(script) = self.scripts.get(&device.name) else {
            return Err(AdapterError::Unreachable(format!("no route to {}", device.address)));
        };
        let answer = pick(script).clone();

        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        answer
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceAdapter for ScriptedAdapter {
    async fn connectivity(&self, device: &Device) -> AdapterResult<ConnectivityProbe> {
        self.respond(device, CheckKind::Connectivity, |s| &s.connectivity).await
    }

    async fn system_status(&self, device: &Device) -> AdapterResult<SystemStatus> {
        self.respond(device, CheckKind::Status, |s| &s.system_status).await
    }

    async fn interfaces(&self, device: &Device) -> AdapterResult<Vec<InterfaceInfo>> {
        self.respond(device, CheckKind::Interface, |s| &s.interfaces).await
    }

    async fn alarms(&self, device: &Device) -> AdapterResult<Vec<AlarmRecord>> {
        self.respond(device, CheckKind::Alarm, |s| &s.alarms).await
    }
}
