// src/engine/liveness.rs

use std::time::{Duration, Instant};

use tracing::warn;

use crate::domain::task::TaskId;
use crate::domain::worker::WorkerId;
use crate::store::Store;

/// Outcome of one liveness scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessReport {
    pub workers_lost: Vec<WorkerId>,
    pub tasks_recovered: Vec<TaskId>,
}

/// Mark workers whose last heartbeat is older than `timeout` as dead and send
/// the tasks they held back to `created`.
///
/// Tasks that already finished are left alone. Safe to call repeatedly: a
/// dead worker is not stale, so nothing is lost twice.
pub fn scan_workers(store: &Store, timeout: Duration, now: Instant) -> LivenessReport {
    let lost = store.workers.update_all(|worker| {
        worker
            .is_stale(now, timeout)
            .then(|| (worker.id().to_string(), worker.mark_dead()))
    });

    let mut report = LivenessReport::default();
    for (worker, task) in lost {
        let recovered = task.filter(|id| store.tasks.update(id, |t| t.recover()).unwrap_or(false));
        warn!(%worker, task = ?recovered, "worker lost; no heartbeat within {:?}", timeout);
        if let Some(id) = recovered {
            report.tasks_recovered.push(id);
        }
        report.workers_lost.push(worker);
    }
    report
}
