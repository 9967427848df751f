use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use stageflow::domain::TaskId;
use stageflow::errors::{Result, StageflowError};
use stageflow::exec::{BackendEvent, ExecutorBackend, ResolvedTask};
use stageflow::types::BackendKind;

/// A fake backend that:
/// - records which tasks were submitted
/// - immediately reports `Started` then `Completed` (or `Failed` for tasks
///   listed in `fail`).
pub struct FakeBackend {
    kind: BackendKind,
    events_tx: mpsc::Sender<BackendEvent>,
    submitted: Arc<Mutex<Vec<ResolvedTask>>>,
    fail: HashSet<TaskId>,
    worker: Option<String>,
}

impl FakeBackend {
    pub fn new(
        kind: BackendKind,
        events_tx: mpsc::Sender<BackendEvent>,
        submitted: Arc<Mutex<Vec<ResolvedTask>>>,
    ) -> Self {
        Self {
            kind,
            events_tx,
            submitted,
            fail: HashSet::new(),
            worker: None,
        }
    }

    /// Report this task as failed instead of completed.
    pub fn failing(mut self, task: TaskId) -> Self {
        self.fail.insert(task);
        self
    }

    /// Name this worker in `Started` events.
    pub fn on_worker(mut self, worker: &str) -> Self {
        self.worker = Some(worker.to_string());
        self
    }
}

impl ExecutorBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn submit(
        &mut self,
        tasks: Vec<ResolvedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.events_tx.clone();
        let submitted = Arc::clone(&self.submitted);
        let fail = self.fail.clone();
        let worker = self.worker.clone();

        Box::pin(async move {
            for t in tasks {
                let id = t.task;
                {
                    let mut guard = submitted.lock().unwrap();
                    guard.push(t);
                }

                let outcome = if fail.contains(&id) {
                    BackendEvent::Failed {
                        task: id,
                        reason: "fake failure".to_string(),
                    }
                } else {
                    BackendEvent::Completed { task: id }
                };

                for event in [
                    BackendEvent::Started {
                        task: id,
                        worker: worker.clone(),
                    },
                    outcome,
                ] {
                    tx.send(event)
                        .await
                        .map_err(|e| StageflowError::Backend(e.to_string()))?;
                }
            }
            Ok(())
        })
    }
}
