// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait, the resolved task type
//!   and the events backends report.
//! - [`dispatcher`] queues created tasks, resolves their actions and applies
//!   backend events to the store.
//! - [`executor_loop`] owns the background loop that runs submitted tasks.
//! - [`task_runner`] runs one task's commands with `tokio::process`.
//! - [`shell`] is the local `ExecutorBackend` built on top of the loop.

pub mod backend;
pub mod dispatcher;
pub mod executor_loop;
pub mod shell;
pub mod task_runner;

pub use backend::{BackendEvent, ExecutorBackend, ResolvedTask};
pub use dispatcher::{DispatchSummary, Dispatcher, apply_event, apply_events};
pub use executor_loop::{ExecutorOptions, spawn_executor};
pub use shell::ShellBackend;
