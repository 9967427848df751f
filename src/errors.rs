// src/errors.rs

//! Crate-wide error types and aliases.

use thiserror::Error;

use crate::action::{ActionKind, Realm};

#[derive(Error, Debug)]
pub enum StageflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    #[error("background trigger timer requires a running Tokio runtime")]
    NoRuntime,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to turn an abstract file action into something a backend can run.
///
/// Resolution fails closed: an action without a matching rule is an error,
/// never silently dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error(
        "no staging rule for {kind:?} {source_realm} -> {target_realm} ({})",
        folder_label(.is_folder)
    )]
    Unsupported {
        kind: ActionKind,
        source_realm: Realm,
        target_realm: Realm,
        is_folder: bool,
    },

    #[error("{kind:?} has no shell form and was not staged")]
    NoShellForm { kind: ActionKind },

    #[error("no resolver in the chain accepted action {action}")]
    Unresolved { action: String },

    #[error("unknown realm in location '{0}'")]
    UnknownRealm(String),

    #[error("invalid action description: {0}")]
    InvalidAction(String),
}

fn folder_label(is_folder: &bool) -> &'static str {
    if *is_folder { "folder" } else { "file" }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StageflowError>;
