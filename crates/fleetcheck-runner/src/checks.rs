use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fleetcheck_adapter::{AdapterError, AdapterResult, DeviceAdapter};
use fleetcheck_core::{
    evaluate_alarms, evaluate_connectivity, evaluate_interfaces, evaluate_status, now_ms,
    CheckDetails, CheckKind, CheckOutcome, Device, Evaluation, StatusThresholds,
};

use crate::events::{EventSink, RunEvent, TracingSink};

pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs single checks against a device through a [`DeviceAdapter`].
///
/// Adapter failures and timeouts become ERROR outcomes; policy violations become FAILED
/// outcomes with one issue per violation. The engine never creates defects.
pub struct CheckEngine {
    adapter: Arc<dyn DeviceAdapter>,
    timeout: Duration,
    thresholds: StatusThresholds,
    sink: Arc<dyn EventSink>,
}

impl CheckEngine {
    pub fn new(adapter: Arc<dyn DeviceAdapter>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            adapter,
            timeout: DEFAULT_ADAPTER_TIMEOUT,
            thresholds: StatusThresholds::default(),
            sink,
        }
    }

    /// Engine that logs through `tracing` only.
    pub fn with_adapter(adapter: Arc<dyn DeviceAdapter>) -> Self {
        Self::new(adapter, Arc::new(TracingSink))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_thresholds(mut self, thresholds: StatusThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub async fn run(&self, kind: CheckKind, device: &Device) -> CheckOutcome {
        let timestamp_ms = now_ms();
        let started = Instant::now();
        let verdict = match kind {
            CheckKind::Connectivity => self
                .call(self.adapter.connectivity(device))
                .await
                .map(|p| (evaluate_connectivity(&p), CheckDetails::Connectivity(p))),
            CheckKind::Status => self
                .call(self.adapter.system_status(device))
                .await
                .map(|s| (evaluate_status(&s, &self.thresholds), CheckDetails::Status(s))),
            CheckKind::Interface => {
                self.call(self.adapter.interfaces(device))
                    .await
                    .map(|ifaces| {
                        let eval = evaluate_interfaces(&ifaces, device.expected_interfaces);
                        (eval, CheckDetails::Interfaces { interfaces: ifaces })
                    })
            }
            CheckKind::Alarm => self.call(self.adapter.alarms(device)).await.map(|alarms| {
                for alarm in &alarms {
                    self.sink.emit(&RunEvent::ActiveAlarm {
                        device: device.name.clone(),
                        alarm: alarm.clone(),
                    });
                }
                (evaluate_alarms(&alarms), CheckDetails::alarms(alarms))
            }),
        };
        let duration_ms = started.elapsed().as_secs_f64() * 1_000.0;

        let outcome = match verdict {
            Ok((Evaluation { status, issues }, details)) => CheckOutcome {
                test_name: kind.test_name(&device.name),
                check: kind,
                device: device.name.clone(),
                status,
                issues,
                details: Some(details),
                error: None,
                duration_ms,
                timestamp_ms,
            },
            Err(e) => CheckOutcome::error(
                kind,
                &device.name,
                e.to_string(),
                duration_ms,
                timestamp_ms,
            ),
        };
        self.sink.emit(&RunEvent::CheckCompleted {
            device: device.name.clone(),
            check: kind,
            status: outcome.status,
            error: outcome.error.clone(),
        });
        outcome
    }

    /// All checks for one device in [`CheckKind::ORDER`]. A failing check never stops
    /// the ones after it.
    pub async fn run_all(&self, device: &Device) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(CheckKind::ORDER.len());
        for kind in CheckKind::ORDER {
            outcomes.push(self.run(kind, device).await);
        }
        outcomes
    }

    async fn call<T>(&self, fut: impl Future<Output = AdapterResult<T>>) -> AdapterResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(r) => r,
            Err(_) => Err(AdapterError::TimedOut(self.timeout)),
        }
    }
}
