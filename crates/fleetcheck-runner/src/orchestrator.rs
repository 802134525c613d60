use std::sync::{Arc, Mutex};
use std::time::Duration;

use fleetcheck_adapter::DeviceAdapter;
use fleetcheck_core::{
    generate, now_ms, CheckKind, CheckOutcome, Defect, Device, Report, RunId, StatusThresholds,
    DEVICE_NOT_FOUND,
};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::warn;

use crate::{
    checks::{CheckEngine, DEFAULT_ADAPTER_TIMEOUT},
    defects::{DefectTracker, DEFAULT_ASSIGNEE},
    events::{EventSink, RunEvent, TracingSink},
    registry::DeviceRegistry,
};

#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    /// Devices in flight at once; at least 1.
    pub concurrency: usize,
    pub adapter_timeout: Duration,
    /// Minimum spacing between device starts.
    pub device_pause: Duration,
    pub thresholds: StatusThresholds,
    pub assigned_to: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            device_pause: Duration::from_secs(1),
            thresholds: StatusThresholds::default(),
            assigned_to: DEFAULT_ASSIGNEE.to_string(),
        }
    }
}

/// What one `run_suite` call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub requested: Vec<String>,
    /// Devices whose outcomes were recorded, in requested order.
    pub completed: Vec<String>,
    /// Devices never started because the run was cancelled.
    pub skipped: Vec<String>,
    /// Outcomes appended by this call.
    pub outcomes: usize,
}

impl SuiteSummary {
    pub fn was_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Runs the check suite over the registry and accumulates outcomes and defects across
/// calls.
pub struct TestOrchestrator {
    run_id: RunId,
    registry: Arc<DeviceRegistry>,
    engine: Arc<CheckEngine>,
    tracker: Arc<DefectTracker>,
    sink: Arc<dyn EventSink>,
    options: RunOptions,
    results: Mutex<Vec<CheckOutcome>>,
}

impl TestOrchestrator {
    pub fn new(
        registry: DeviceRegistry,
        adapter: Arc<dyn DeviceAdapter>,
        options: RunOptions,
    ) -> Self {
        Self::with_sink(registry, adapter, options, Arc::new(TracingSink))
    }

    pub fn with_sink(
        registry: DeviceRegistry,
        adapter: Arc<dyn DeviceAdapter>,
        options: RunOptions,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let engine = CheckEngine::new(adapter, sink.clone())
            .with_timeout(options.adapter_timeout)
            .with_thresholds(options.thresholds);
        let tracker = DefectTracker::new(sink.clone()).with_assignee(options.assigned_to.clone());
        Self {
            run_id: RunId::new(),
            registry: Arc::new(registry),
            engine: Arc::new(engine),
            tracker: Arc::new(tracker),
            sink,
            options,
            results: Mutex::new(Vec::new()),
        }
    }

    /// Run every named device, or the whole registry in registry order when `devices`
    /// is `None`.
    pub async fn run_suite(&self, devices: Option<&[String]>) -> SuiteSummary {
        let (_keep, cancel) = watch::channel(false);
        self.run_suite_until(devices, cancel).await
    }

    /// Like [`TestOrchestrator::run_suite`], but stops starting new devices once `cancel`
    /// reads `true`. Devices already started finish and are recorded.
    pub async fn run_suite_until(
        &self,
        devices: Option<&[String]>,
        mut cancel: watch::Receiver<bool>,
    ) -> SuiteSummary {
        let requested: Vec<String> = match devices {
            Some(names) => names.to_vec(),
            None => self.registry.names(),
        };
        self.sink.emit(&RunEvent::RunStarted {
            run_id: self.run_id.clone(),
            devices: requested.len(),
        });

        let workers = worker_count(self.options.concurrency, requested.len());
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut skipped = Vec::new();
        let mut last_start: Option<Instant> = None;

        for (pos, name) in requested.iter().enumerate() {
            let pause = self.options.device_pause;
            let gate = {
                let permits = permits.clone();
                async move {
                    if let Some(at) = last_start {
                        tokio::time::sleep_until(at + pause).await;
                    }
                    permits.acquire_owned().await
                }
            };
            let permit = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => None,
                p = gate => p.ok(),
            };
            let Some(permit) = permit else {
                skipped.extend(requested[pos..].iter().cloned());
                break;
            };
            last_start = Some(Instant::now());

            let device = self.registry.get(name).cloned();
            let name = name.clone();
            let engine = self.engine.clone();
            let tracker = self.tracker.clone();
            let sink = self.sink.clone();
            tasks.spawn(async move {
                let outcomes = run_device(&engine, &tracker, sink.as_ref(), &name, device).await;
                drop(permit);
                (pos, outcomes)
            });
        }

        let mut slots: Vec<Option<Vec<CheckOutcome>>> = vec![None; requested.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pos, outcomes)) => slots[pos] = Some(outcomes),
                Err(e) => warn!("device task failed: {e}"),
            }
        }

        let mut completed = Vec::new();
        let mut appended = Vec::new();
        for (name, slot) in requested.iter().zip(slots) {
            if let Some(outcomes) = slot {
                completed.push(name.clone());
                appended.extend(outcomes);
            }
        }
        let outcomes = appended.len();
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(appended);

        if !skipped.is_empty() {
            self.sink.emit(&RunEvent::RunCancelled {
                skipped: skipped.clone(),
            });
        }
        self.sink.emit(&RunEvent::RunFinished {
            run_id: self.run_id.clone(),
            results: self.results_len(),
            defects: self.tracker.len(),
        });

        SuiteSummary {
            requested,
            completed,
            skipped,
            outcomes,
        }
    }

    /// Every outcome recorded so far, grouped by device in requested order.
    pub fn results(&self) -> Vec<CheckOutcome> {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn defects(&self) -> Vec<Defect> {
        self.tracker.defects()
    }

    pub fn generate_report(&self) -> Report {
        generate(&self.results(), &self.defects()).with_run_id(self.run_id.clone())
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    fn results_len(&self) -> usize {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

async fn run_device(
    engine: &CheckEngine,
    tracker: &DefectTracker,
    sink: &dyn EventSink,
    name: &str,
    device: Option<Device>,
) -> Vec<CheckOutcome> {
    sink.emit(&RunEvent::DeviceStarted {
        device: name.to_string(),
    });

    let Some(device) = device else {
        let outcome = CheckOutcome::error(
            CheckKind::Connectivity,
            name,
            DEVICE_NOT_FOUND,
            0.0,
            now_ms(),
        );
        sink.emit(&RunEvent::CheckCompleted {
            device: name.to_string(),
            check: outcome.check,
            status: outcome.status,
            error: outcome.error.clone(),
        });
        return vec![outcome];
    };

    let outcomes = engine.run_all(&device).await;
    for outcome in outcomes.iter().filter(|o| o.is_failed()) {
        for issue in &outcome.issues {
            tracker.create(&device.name, outcome.check.defect_category(), issue);
        }
    }
    outcomes
}

/// Permits for a run: at least one, never more than there are devices or than a
/// semaphore can hold.
pub fn worker_count(concurrency: usize, devices: usize) -> usize {
    concurrency
        .clamp(1, Semaphore::MAX_PERMITS)
        .min(devices.max(1))
}

/// Resolves once `cancel` reads `true`. A dropped sender never cancels.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
