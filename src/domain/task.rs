// src/domain/task.rs

//! Units of work and their lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::action::{Action, FileRef};
use crate::errors::{Result, StageflowError};
use crate::store::{FileKind, Keyed};

pub type TaskId = u64;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a task.
///
/// ```text
/// created -> queued -> running -> done
///                         \----> failed
/// running/queued -> created      (worker lost, task re-dispatched)
/// ```
///
/// `done` and `failed` are terminal. A failed task is never retried
/// automatically; only worker loss sends a task back to `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Created,
    Queued,
    Running,
    Done,
    Failed,
}

impl TaskState {
    pub fn is_finished(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }

    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Created, Queued)
                | (Queued, Running)
                | (Running, Done)
                | (Running, Failed)
                // Dispatch failures (e.g. unresolvable actions).
                | (Created, Failed)
                | (Queued, Failed)
                // Worker-loss recovery.
                | (Queued, Created)
                | (Running, Created)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Created => "created",
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Resources a task asks the backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    pub cores: u32,
    pub walltime: Option<Duration>,
}

impl Default for ResourceRequest {
    fn default() -> Self {
        Self {
            cores: 1,
            walltime: None,
        }
    }
}

/// The action producing a task's primary result, plus what kind of file that
/// result is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub action: Action,
    pub kind: FileKind,
}

impl TaskOutput {
    /// The file the output action leaves behind.
    pub fn file(&self) -> Option<&FileRef> {
        self.action.target().or_else(|| self.action.source())
    }
}

/// A unit of work: an ordered, immutable list of actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    actions: Vec<Action>,
    state: TaskState,
    generator: Option<String>,
    output: Option<TaskOutput>,
    resources: ResourceRequest,
}

impl Task {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            actions,
            state: TaskState::Created,
            generator: None,
            output: None,
            resources: ResourceRequest::default(),
        }
    }

    /// Name of the generator that produced this task.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    pub fn with_output(mut self, action: Action, kind: FileKind) -> Self {
        self.output = Some(TaskOutput { action, kind });
        self
    }

    pub fn with_resources(mut self, resources: ResourceRequest) -> Self {
        self.resources = resources;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn generator(&self) -> Option<&str> {
        self.generator.as_deref()
    }

    pub fn output(&self) -> Option<&TaskOutput> {
        self.output.as_ref()
    }

    pub fn resources(&self) -> ResourceRequest {
        self.resources
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Move to `next`, rejecting transitions the state machine does not allow.
    pub fn transition(&mut self, next: TaskState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(StageflowError::InvalidTransition {
                entity: "task",
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Send an unfinished task back to `created` after its worker was lost.
    ///
    /// Returns `false` (and changes nothing) if the task is not queued or
    /// running.
    pub fn recover(&mut self) -> bool {
        if self.state.can_transition_to(TaskState::Created) {
            self.state = TaskState::Created;
            true
        } else {
            false
        }
    }
}

impl Keyed for Task {
    type Key = TaskId;

    fn key(&self) -> &TaskId {
        &self.id
    }
}
