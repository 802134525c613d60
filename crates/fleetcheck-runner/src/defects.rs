use std::sync::{Arc, Mutex};

use fleetcheck_core::{determine_severity, now_ms, Defect, DefectCategory, DefectId, DefectStatus};

use crate::events::{EventSink, RunEvent, TracingSink};

pub const DEFAULT_ASSIGNEE: &str = "verification_team";

#[derive(Debug, Default)]
struct TrackerState {
    next_seq: u64,
    defects: Vec<Defect>,
}

/// Creates defects with sequential `DEF-nnnn` ids.
///
/// Id assignment and the append happen under one lock, so concurrent callers get unique,
/// strictly increasing ids and the stored list stays in id order.
pub struct DefectTracker {
    state: Mutex<TrackerState>,
    sink: Arc<dyn EventSink>,
    assigned_to: String,
}

impl DefectTracker {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            sink,
            assigned_to: DEFAULT_ASSIGNEE.to_string(),
        }
    }

    pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = assigned_to.into();
        self
    }

    pub fn create(&self, device: &str, category: DefectCategory, description: &str) -> Defect {
        let severity = determine_severity(&category, description);
        let defect = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.next_seq += 1;
            let defect = Defect {
                defect_id: DefectId::from_sequence(state.next_seq),
                device: device.to_string(),
                category,
                description: description.to_string(),
                severity,
                status: DefectStatus::Open,
                assigned_to: self.assigned_to.clone(),
                created_at_ms: now_ms(),
            };
            state.defects.push(defect.clone());
            defect
        };
        self.sink.emit(&RunEvent::DefectCreated {
            defect: defect.clone(),
        });
        defect
    }

    /// Snapshot in id order.
    pub fn defects(&self) -> Vec<Defect> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .defects
            .clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).defects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DefectTracker {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use fleetcheck_core::Severity;
    use std::collections::HashSet;

    #[test]
    fn ids_are_sequential_and_zero_padded() {
        let tracker = DefectTracker::default();
        let a = tracker.create(
            "d1",
            DefectCategory::Connectivity,
            "Connectivity failed - device unreachable",
        );
        let b = tracker.create("d1", DefectCategory::Interface, "Interface eth3 is down");
        let c = tracker.create("d2", DefectCategory::Performance, "High CPU usage: 85.5%");
        assert_eq!(a.defect_id.to_string(), "DEF-0001");
        assert_eq!(b.defect_id.to_string(), "DEF-0002");
        assert_eq!(c.defect_id.to_string(), "DEF-0003");
        assert_eq!(
            (a.severity, b.severity, c.severity),
            (Severity::Critical, Severity::Major, Severity::Minor)
        );
        assert_eq!(c.status, DefectStatus::Open);
        assert_eq!(c.assigned_to, DEFAULT_ASSIGNEE);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn every_defect_is_announced() {
        let sink = Arc::new(RecordingSink::new());
        let tracker = DefectTracker::new(sink.clone()).with_assignee("noc");
        let d = tracker.create("d1", DefectCategory::Interface, "Expected 4 interfaces, found 3");
        assert_eq!(d.assigned_to, "noc");
        assert_eq!(sink.events(), vec![RunEvent::DefectCreated { defect: d }]);
    }

    #[test]
    fn concurrent_creation_keeps_ids_unique_and_ordered() {
        let tracker = Arc::new(DefectTracker::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        tracker.create(
                            &format!("d{t}"),
                            DefectCategory::Performance,
                            &format!("issue {i}"),
                        );
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let defects = tracker.defects();
        assert_eq!(defects.len(), 400);
        let ids: HashSet<_> = defects.iter().map(|d| d.defect_id).collect();
        assert_eq!(ids.len(), 400);
        assert!(defects.windows(2).all(|w| w[0].defect_id < w[1].defect_id));
        assert_eq!(defects.last().map(|d| d.defect_id.sequence()), Some(400));
    }
}
