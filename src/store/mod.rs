// src/store/mod.rs

//! The shared object store.
//!
//! - [`ObjectStore`] is one lock-protected, insertion-ordered collection.
//! - [`Store`] groups the collections the engine and its conditions look at:
//!   tasks, workers, files and models.

mod collection;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::action::FileRef;
use crate::domain::task::{Task, TaskId, TaskState};
use crate::domain::worker::{Worker, WorkerId};
use crate::errors::{Result, StageflowError};

pub(crate) use collection::lock;
pub use collection::{Keyed, ObjectStore};

/// What a tracked file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Trajectory,
    Model,
    Other,
}

/// A file some task is expected to produce.
///
/// `created` flips to `true` once the producing task finishes successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file: FileRef,
    pub kind: FileKind,
    pub producer: Option<TaskId>,
    pub created: bool,
}

/// A model built from finished trajectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub id: u64,
    pub name: String,
    pub producer: Option<TaskId>,
}

impl Keyed for ModelRecord {
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub tasks: ObjectStore<Task>,
    pub workers: ObjectStore<Worker>,
    pub files: ObjectStore<FileRecord>,
    pub models: ObjectStore<ModelRecord>,
    last_model_id: Arc<AtomicU64>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task in `created` state and start tracking its output file.
    pub fn queue_task(&self, task: Task) -> TaskId {
        let id = task.id();
        if let Some(output) = task.output()
            && let Some(file) = output.file()
        {
            self.files.insert(FileRecord {
                file: file.clone(),
                kind: output.kind,
                producer: Some(id),
                created: false,
            });
        }
        debug!(task = id, actions = task.actions().len(), "task queued");
        self.tasks.insert(task);
        id
    }

    pub fn task_state(&self, id: TaskId) -> Option<TaskState> {
        self.tasks.update(&id, |task| task.state())
    }

    /// Apply a state transition to a stored task.
    pub fn transition_task(&self, id: TaskId, next: TaskState) -> Result<()> {
        self.tasks
            .update(&id, |task| task.transition(next))
            .ok_or(StageflowError::TaskNotFound(id))?
    }

    /// Finish a running task and mark the file it produced as created.
    pub fn complete_task(&self, id: TaskId) -> Result<()> {
        self.transition_task(id, TaskState::Done)?;
        let created = self.files.update_all(|record| {
            (record.producer == Some(id) && !record.created).then(|| {
                record.created = true;
                record.kind
            })
        });
        if created.contains(&FileKind::Model) {
            let model_id = self.last_model_id.fetch_add(1, Ordering::Relaxed) + 1;
            self.models.insert(ModelRecord {
                id: model_id,
                name: format!("model-{model_id}"),
                producer: Some(id),
            });
        }
        debug!(task = id, files = created.len(), "task done");
        Ok(())
    }

    pub fn fail_task(&self, id: TaskId) -> Result<()> {
        self.transition_task(id, TaskState::Failed)
    }

    /// Number of tasks that are not yet done or failed.
    pub fn unfinished_tasks(&self) -> usize {
        self.tasks.count(|task| !task.is_finished())
    }

    /// Tasks waiting for dispatch.
    pub fn created_tasks(&self) -> Vec<Task> {
        self.tasks.filter(|task| task.state() == TaskState::Created)
    }

    /// Number of trajectory files that exist.
    pub fn trajectories(&self) -> usize {
        self.files
            .count(|record| record.kind == FileKind::Trajectory && record.created)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Register a new worker, or treat a known id as a heartbeat.
    pub fn register_worker(&self, id: impl Into<WorkerId>, now: Instant) {
        let id = id.into();
        if self.workers.update(&*id, |worker| worker.heartbeat(now)).is_none() {
            info!(worker = %id, "worker registered");
            self.workers.insert(Worker::new(id, now));
        }
    }

    pub fn heartbeat(&self, id: &str, now: Instant) -> Result<()> {
        self.workers
            .update(id, |worker| worker.heartbeat(now))
            .ok_or_else(|| StageflowError::WorkerNotFound(id.to_string()))
    }

    /// Bind a task to an idle worker.
    pub fn assign_worker(&self, id: &str, task: TaskId) -> Result<()> {
        self.workers
            .update(id, |worker| worker.assign(task))
            .ok_or_else(|| StageflowError::WorkerNotFound(id.to_string()))?
    }

    /// Free whichever worker is holding `task`.
    pub fn release_worker_of(&self, task: TaskId) -> Option<WorkerId> {
        self.workers
            .update_all(|worker| {
                if worker.current() == Some(task) {
                    worker.release().ok().map(|_| worker.id().to_string())
                } else {
                    None
                }
            })
            .into_iter()
            .next()
    }
}
