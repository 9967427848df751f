// src/exec/executor_loop.rs

//! Background loop that runs submitted tasks.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use crate::domain::worker::WorkerId;
use crate::exec::backend::{BackendEvent, ResolvedTask};
use crate::exec::task_runner::run_task;

/// Where and how the executor loop runs tasks.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub workdir: PathBuf,
    /// Reported in `Started` events, if set.
    pub worker: Option<WorkerId>,
    /// Upper bound on tasks running at once.
    pub max_parallel: usize,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            worker: None,
            max_parallel: 4,
        }
    }
}

/// Spawn the background executor loop.
///
/// Each received task runs in its own Tokio task once a parallelism permit
/// is free. Progress goes out on `events_tx`.
pub fn spawn_executor(
    options: ExecutorOptions,
    events_tx: mpsc::Sender<BackendEvent>,
) -> mpsc::Sender<ResolvedTask> {
    let (tx, mut rx) = mpsc::channel::<ResolvedTask>(32);
    let permits = Arc::new(Semaphore::new(options.max_parallel.max(1)));

    tokio::spawn(async move {
        info!(workdir = %options.workdir.display(), "executor loop started");

        while let Some(task) = rx.recv().await {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let events_tx = events_tx.clone();
            let workdir = options.workdir.clone();
            let worker = options.worker.clone();
            let id = task.task;

            tokio::spawn(async move {
                run_task(task, &workdir, worker, events_tx).await;
                drop(permit);
                debug!(task = id, "task runner future finished");
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
