// src/exec/shell.rs

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::{Result, StageflowError};
use crate::exec::backend::{BackendEvent, ExecutorBackend, ResolvedTask};
use crate::exec::executor_loop::{ExecutorOptions, spawn_executor};
use crate::types::BackendKind;

/// Runs resolved tasks as local shell commands.
///
/// Wraps the executor loop from [`spawn_executor`]; `submit` forwards tasks
/// to it over a channel.
pub struct ShellBackend {
    tx: mpsc::Sender<ResolvedTask>,
}

impl ShellBackend {
    /// Start the executor loop and report progress on `events_tx`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(options: ExecutorOptions, events_tx: mpsc::Sender<BackendEvent>) -> Self {
        Self {
            tx: spawn_executor(options, events_tx),
        }
    }
}

impl ExecutorBackend for ShellBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn submit(
        &mut self,
        tasks: Vec<ResolvedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task)
                    .await
                    .map_err(|err| StageflowError::Backend(format!("executor loop gone: {err}")))?;
            }
            Ok(())
        })
    }
}
