use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fleetcheck_core::{AlarmRecord, ConnectivityProbe, Device, InterfaceInfo, SystemStatus};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{error::AdapterResult, traits::DeviceAdapter};

const ALARM_TIMESTAMP: &str = "2025-09-26T10:30:00Z";

/// Stand-in for a device's management plane.
///
/// Latency is drawn uniformly from 1..50 ms and the management port is closed with
/// probability `port_failure_rate`. Metrics are healthy, every interface is up except
/// the last one, and devices with more than three interfaces raise one minor alarm
/// for that link.
pub struct SimulatedAdapter {
    rng: Mutex<StdRng>,
    port_failure_rate: f64,
    latency: Duration,
}

impl SimulatedAdapter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible simulator: the same seed yields the same probe sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            port_failure_rate: 0.05,
            latency: Duration::ZERO,
        }
    }

    pub fn with_port_failure_rate(mut self, rate: f64) -> Self {
        self.port_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Artificial delay added to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for SimulatedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceAdapter for SimulatedAdapter {
    async fn connectivity(&self, _device: &Device) -> AdapterResult<ConnectivityProbe> {
        self.pause().await;
        let (response_time_ms, draw) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            (rng.gen_range(1.0..50.0), rng.gen::<f64>())
        };
        Ok(ConnectivityProbe {
            reachable: true,
            response_time_ms,
            port_open: draw >= self.port_failure_rate,
        })
    }

    async fn system_status(&self, device: &Device) -> AdapterResult<SystemStatus> {
        self.pause().await;
        Ok(SystemStatus {
            status: "operational".into(),
            uptime: "72:15:30".into(),
            cpu_usage_pct: 15.2,
            memory_usage_pct: 45.8,
            temperature_c: 35.2,
            interfaces_up: device.expected_interfaces,
        })
    }

    async fn interfaces(&self, device: &Device) -> AdapterResult<Vec<InterfaceInfo>> {
        self.pause().await;
        let n = device.expected_interfaces;
        Ok((0..n)
            .map(|i| InterfaceInfo {
                name: format!("eth{i}"),
                status: if i + 1 < n { "up" } else { "down" }.into(),
                speed: "10Gbps".into(),
                duplex: "full".into(),
            })
            .collect())
    }

    async fn alarms(&self, device: &Device) -> AdapterResult<Vec<AlarmRecord>> {
        self.pause().await;
        let n = device.expected_interfaces;
        if n <= 3 {
            return Ok(vec![]);
        }
        Ok(vec![AlarmRecord {
            severity: "minor".into(),
            message: format!("Interface eth{} down", n - 1),
            timestamp: ALARM_TIMESTAMP.into(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetcheck_core::builtin_devices;

    #[tokio::test]
    async fn last_interface_is_down() {
        let sim = SimulatedAdapter::seeded(1);
        let optical = &builtin_devices()[0];
        let ifaces = sim.interfaces(optical).await.unwrap();
        assert_eq!(ifaces.len(), 4);
        assert!(ifaces[..3].iter().all(|i| i.is_up()));
        assert_eq!(ifaces[3].name, "eth3");
        assert_eq!(ifaces[3].status, "down");
    }

    #[tokio::test]
    async fn alarms_only_for_wide_devices() {
        let sim = SimulatedAdapter::seeded(1);
        let devices = builtin_devices();
        let optical = sim.alarms(&devices[0]).await.unwrap();
        assert_eq!(optical.len(), 1);
        assert_eq!(optical[0].message, "Interface eth3 down");
        assert!(sim.alarms(&devices[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn same_seed_same_probes() {
        let device = &builtin_devices()[0];
        let a = SimulatedAdapter::seeded(7);
        let b = SimulatedAdapter::seeded(7);
        for _ in 0..5 {
            assert_eq!(
                a.connectivity(device).await.unwrap(),
                b.connectivity(device).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn failure_rate_bounds_port_state() {
        let device = &builtin_devices()[0];
        let always = SimulatedAdapter::seeded(3).with_port_failure_rate(0.0);
        let never = SimulatedAdapter::seeded(3).with_port_failure_rate(1.0);
        for _ in 0..20 {
            let p = always.connectivity(device).await.unwrap();
            assert!(p.port_open);
            assert!(p.response_time_ms >= 1.0 && p.response_time_ms < 50.0);
            assert!(!never.connectivity(device).await.unwrap().port_open);
        }
    }
}
