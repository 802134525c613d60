use std::sync::Mutex;

use fleetcheck_core::{AlarmRecord, CheckKind, CheckStatus, Defect, RunId};
use tracing::{error, info, warn};

/// Something observable that happened during a run.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    RunStarted {
        run_id: RunId,
        devices: usize,
    },
    DeviceStarted {
        device: String,
    },
    CheckCompleted {
        device: String,
        check: CheckKind,
        status: CheckStatus,
        error: Option<String>,
    },
    DefectCreated {
        defect: Defect,
    },
    ActiveAlarm {
        device: String,
        alarm: AlarmRecord,
    },
    RunCancelled {
        skipped: Vec<String>,
    },
    RunFinished {
        run_id: RunId,
        results: usize,
        defects: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RunEvent);
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { run_id, devices } => {
                info!(run_id = %run_id.as_str(), devices, "test suite started");
            }
            RunEvent::DeviceStarted { device } => {
                info!(device = %device, "testing device");
            }
            RunEvent::CheckCompleted {
                device,
                check,
                status,
                error: Some(err),
            } => {
                warn!(
                    device = %device,
                    check = %check,
                    status = %status,
                    "check did not complete: {err}"
                );
            }
            RunEvent::CheckCompleted {
                device,
                check,
                status,
                error: None,
            } => {
                info!(device = %device, check = %check, status = %status, "check completed");
            }
            RunEvent::DefectCreated { defect } => {
                error!(
                    defect_id = %defect.defect_id,
                    device = %defect.device,
                    category = %defect.category,
                    severity = %defect.severity,
                    "defect created: {}",
                    defect.description
                );
            }
            RunEvent::ActiveAlarm { device, alarm } => {
                warn!(
                    device = %device,
                    severity = %alarm.severity,
                    raised_at = %alarm.timestamp,
                    "active alarm: {}",
                    alarm.message
                );
            }
            RunEvent::RunCancelled { skipped } => {
                warn!(skipped = skipped.len(), "run cancelled; skipped {:?}", skipped);
            }
            RunEvent::RunFinished {
                run_id,
                results,
                defects,
            } => {
                info!(run_id = %run_id.as_str(), results, defects, "test suite finished");
            }
        }
    }
}

/// Keeps every event in memory, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
