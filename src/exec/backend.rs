// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The dispatcher hands resolved tasks to an `ExecutorBackend` and learns
//! about their progress through [`BackendEvent`]s sent back over a channel.
//! Tests swap in a fake backend that records submissions and emits events
//! directly.

use std::future::Future;
use std::pin::Pin;

use crate::domain::task::{ResourceRequest, TaskId};
use crate::domain::worker::WorkerId;
use crate::errors::Result;
use crate::staging::ResolvedUnit;
use crate::types::BackendKind;

/// A task whose actions have been resolved into executable units.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTask {
    pub task: TaskId,
    pub units: Vec<ResolvedUnit>,
    pub resources: ResourceRequest,
}

impl ResolvedTask {
    /// The shell commands of this task, in order. `None` if any unit is a
    /// staging directive.
    pub fn commands(&self) -> Option<Vec<&str>> {
        self.units.iter().map(ResolvedUnit::as_command).collect()
    }
}

/// Progress reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Started {
        task: TaskId,
        worker: Option<WorkerId>,
    },
    Completed {
        task: TaskId,
    },
    Failed {
        task: TaskId,
        reason: String,
    },
}

impl BackendEvent {
    pub fn task(&self) -> TaskId {
        match self {
            BackendEvent::Started { task, .. }
            | BackendEvent::Completed { task }
            | BackendEvent::Failed { task, .. } => *task,
        }
    }
}

/// Trait abstracting how resolved tasks are executed.
pub trait ExecutorBackend: Send {
    /// Which resolver chain tasks for this backend must go through.
    fn kind(&self) -> BackendKind;

    /// Accept tasks for execution.
    ///
    /// Completion is reported asynchronously through `BackendEvent`s; the
    /// returned future only covers handing the tasks over.
    fn submit(
        &mut self,
        tasks: Vec<ResolvedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
