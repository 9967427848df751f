// src/exec/dispatcher.rs

//! Moves created tasks to a backend and applies what the backend reports.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::task::{TaskId, TaskState};
use crate::errors::{ResolutionError, Result};
use crate::exec::backend::{BackendEvent, ExecutorBackend, ResolvedTask};
use crate::staging::{ResolveContext, ResolverChain};
use crate::store::Store;

/// Result of one [`Dispatcher::dispatch`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Tasks handed to the backend.
    pub submitted: Vec<TaskId>,
    /// Tasks that could not be resolved. They are marked failed.
    pub rejected: Vec<(TaskId, ResolutionError)>,
}

pub struct Dispatcher<B: ExecutorBackend> {
    store: Store,
    chain: ResolverChain,
    ctx: ResolveContext,
    backend: B,
}

impl<B: ExecutorBackend> std::fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chain", &self.chain.names())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl<B: ExecutorBackend> Dispatcher<B> {
    /// A dispatcher using the resolver chain that matches the backend.
    pub fn new(store: Store, ctx: ResolveContext, backend: B) -> Self {
        let chain = ResolverChain::for_backend(backend.kind());
        Self {
            store,
            chain,
            ctx,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Queue every created task, resolve it and submit the resolvable ones.
    ///
    /// A task whose actions fail to resolve is marked failed and reported in
    /// [`DispatchSummary::rejected`]; the others still go out.
    pub async fn dispatch(&mut self) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();
        let mut ready = Vec::new();

        for task in self.store.created_tasks() {
            let id = task.id();
            self.store.transition_task(id, TaskState::Queued)?;

            match self.chain.resolve(&self.ctx, task.actions()) {
                Ok(units) => {
                    debug!(task = id, units = units.len(), "task resolved");
                    ready.push(ResolvedTask {
                        task: id,
                        units,
                        resources: task.resources(),
                    });
                }
                Err(err) => {
                    warn!(task = id, error = %err, "task rejected");
                    self.store.fail_task(id)?;
                    summary.rejected.push((id, err));
                }
            }
        }

        if ready.is_empty() {
            return Ok(summary);
        }

        summary.submitted = ready.iter().map(|t| t.task).collect();
        info!(tasks = ?summary.submitted, "submitting tasks");
        self.backend.submit(ready).await?;
        Ok(summary)
    }

    /// Apply one backend event to the store.
    pub fn apply(&self, event: BackendEvent) -> Result<()> {
        apply_event(&self.store, event)
    }
}

/// Record a backend event in the store.
///
/// - `Started`: queued -> running, binding the worker if one is named.
/// - `Completed`: running -> done, marking outputs as created.
/// - `Failed`: running -> failed.
///
/// Finishing a task frees the worker that held it.
pub fn apply_event(store: &Store, event: BackendEvent) -> Result<()> {
    match event {
        BackendEvent::Started { task, worker } => {
            store.transition_task(task, TaskState::Running)?;
            if let Some(worker) = worker {
                store.assign_worker(&worker, task)?;
            }
        }
        BackendEvent::Completed { task } => {
            store.complete_task(task)?;
            store.release_worker_of(task);
        }
        BackendEvent::Failed { task, reason } => {
            warn!(task, %reason, "task failed");
            store.fail_task(task)?;
            store.release_worker_of(task);
        }
    }
    Ok(())
}

/// Apply backend events until the channel closes.
///
/// Events that do not fit the current state (for example a late completion
/// for a task that was already recovered) are logged and dropped.
pub async fn apply_events(store: Store, mut events_rx: mpsc::Receiver<BackendEvent>) {
    while let Some(event) = events_rx.recv().await {
        let task = event.task();
        if let Err(err) = apply_event(&store, event) {
            warn!(task, error = %err, "ignoring backend event");
        }
    }
    debug!("backend event channel closed");
}
