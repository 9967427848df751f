// src/domain/mod.rs

//! Tasks, workers, conditions and events.

pub mod condition;
pub mod event;
pub mod task;
pub mod worker;

pub use condition::{
    AllOf, Always, AnyOf, Condition, ConditionExt, FnCondition, NModels, NTrajectories, Never,
    Not, TasksFinished,
};
pub use event::{Event, EventContext, EventId, Next};
pub use task::{ResourceRequest, Task, TaskId, TaskOutput, TaskState};
pub use worker::{Worker, WorkerId, WorkerState};
