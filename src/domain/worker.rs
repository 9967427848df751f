// src/domain/worker.rs

use std::fmt;
use std::time::{Duration, Instant};

use crate::domain::task::TaskId;
use crate::errors::{Result, StageflowError};
use crate::store::Keyed;

pub type WorkerId = String;

/// Lifecycle of a worker.
///
/// `idle <-> running`, `idle|running -> dead` on heartbeat timeout,
/// `idle|dead -> down` administratively, and `dead -> idle` when a lost
/// worker reconnects with a fresh heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    Idle,
    Running,
    Dead,
    Down,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Running => "running",
            WorkerState::Dead => "dead",
            WorkerState::Down => "down",
        };
        f.write_str(s)
    }
}

/// A live execution agent.
///
/// Invariant: `current` is only set while the worker is `running`.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    id: WorkerId,
    state: WorkerState,
    last_seen: Instant,
    current: Option<TaskId>,
}

impl Worker {
    pub fn new(id: impl Into<WorkerId>, now: Instant) -> Self {
        Self {
            id: id.into(),
            state: WorkerState::Idle,
            last_seen: now,
            current: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    pub fn current(&self) -> Option<TaskId> {
        self.current
    }

    /// Record a heartbeat. Timestamps only move forward.
    ///
    /// A dead worker that reports in again is re-registered as idle; a worker
    /// that was taken down stays down.
    pub fn heartbeat(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
        if self.state == WorkerState::Dead {
            self.state = WorkerState::Idle;
        }
    }

    /// Whether the last heartbeat is older than `timeout`.
    ///
    /// Dead and down workers are never stale.
    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        !matches!(self.state, WorkerState::Dead | WorkerState::Down)
            && now.saturating_duration_since(self.last_seen) > timeout
    }

    pub fn assign(&mut self, task: TaskId) -> Result<()> {
        if self.state != WorkerState::Idle {
            return Err(self.invalid(WorkerState::Running));
        }
        self.state = WorkerState::Running;
        self.current = Some(task);
        Ok(())
    }

    /// Finish the current assignment and go back to idle.
    pub fn release(&mut self) -> Result<Option<TaskId>> {
        if self.state != WorkerState::Running {
            return Err(self.invalid(WorkerState::Idle));
        }
        self.state = WorkerState::Idle;
        Ok(self.current.take())
    }

    /// Mark the worker as lost and hand back the task it was holding.
    pub fn mark_dead(&mut self) -> Option<TaskId> {
        self.state = WorkerState::Dead;
        self.current.take()
    }

    /// Administrative shutdown.
    pub fn shut_down(&mut self) -> Result<()> {
        match self.state {
            WorkerState::Idle | WorkerState::Dead => {
                self.state = WorkerState::Down;
                Ok(())
            }
            WorkerState::Down => Ok(()),
            WorkerState::Running => Err(self.invalid(WorkerState::Down)),
        }
    }

    fn invalid(&self, to: WorkerState) -> StageflowError {
        StageflowError::InvalidTransition {
            entity: "worker",
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}

impl Keyed for Worker {
    type Key = str;

    fn key(&self) -> &str {
        &self.id
    }
}
