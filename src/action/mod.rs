// src/action/mod.rs

//! Abstract file actions.
//!
//! An [`Action`] describes a filesystem side effect in terms of realm-tagged
//! [`FileRef`]s. Actions are plain values; the staging resolvers turn them into
//! shell commands or backend staging directives without mutating them.
//!
//! - [`location`] holds [`Realm`] and [`FileRef`].
//! - [`spec`] reads action lists from TOML (used by `stageflow resolve`).

pub mod location;
pub mod spec;

use std::fmt;

use serde::Deserialize;

pub use location::{FileRef, Realm};
pub use spec::{ActionFile, ActionSpec};

/// Discriminant of an [`Action`], used as part of the staging rule key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Copy,
    Move,
    Link,
    Transfer,
    Remove,
    Touch,
    MakeDir,
    PathExport,
}

impl ActionKind {
    /// Whether actions of this kind move data between two locations.
    pub fn is_transaction(self) -> bool {
        matches!(
            self,
            ActionKind::Copy | ActionKind::Move | ActionKind::Link | ActionKind::Transfer
        )
    }
}

/// A file-system side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy { source: FileRef, target: FileRef },
    Move { source: FileRef, target: FileRef },
    Link { source: FileRef, target: FileRef },
    Transfer { source: FileRef, target: FileRef },
    Remove(FileRef),
    Touch(FileRef),
    MakeDir(FileRef),
    /// Prepend a directory to `PATH`.
    PathExport(String),
}

impl Action {
    pub fn copy(source: FileRef, target: FileRef) -> Self {
        Action::Copy { source, target }
    }

    pub fn mv(source: FileRef, target: FileRef) -> Self {
        Action::Move { source, target }
    }

    pub fn link(source: FileRef, target: FileRef) -> Self {
        Action::Link { source, target }
    }

    pub fn transfer(source: FileRef, target: FileRef) -> Self {
        Action::Transfer { source, target }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Copy { .. } => ActionKind::Copy,
            Action::Move { .. } => ActionKind::Move,
            Action::Link { .. } => ActionKind::Link,
            Action::Transfer { .. } => ActionKind::Transfer,
            Action::Remove(_) => ActionKind::Remove,
            Action::Touch(_) => ActionKind::Touch,
            Action::MakeDir(_) => ActionKind::MakeDir,
            Action::PathExport(_) => ActionKind::PathExport,
        }
    }

    /// Source (or only) file reference, if the action has one.
    pub fn source(&self) -> Option<&FileRef> {
        match self {
            Action::Copy { source, .. }
            | Action::Move { source, .. }
            | Action::Link { source, .. }
            | Action::Transfer { source, .. } => Some(source),
            Action::Remove(f) | Action::Touch(f) | Action::MakeDir(f) => Some(f),
            Action::PathExport(_) => None,
        }
    }

    pub fn target(&self) -> Option<&FileRef> {
        self.transaction().map(|(_, target)| target)
    }

    /// `(source, target)` for Copy/Move/Link/Transfer.
    pub fn transaction(&self) -> Option<(&FileRef, &FileRef)> {
        match self {
            Action::Copy { source, target }
            | Action::Move { source, target }
            | Action::Link { source, target }
            | Action::Transfer { source, target } => Some((source, target)),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PathExport(path) => write!(f, "PathExport({path})"),
            other => match (other.source(), other.target()) {
                (Some(s), Some(t)) => write!(f, "{:?}({s} -> {t})", other.kind()),
                (Some(s), None) => write!(f, "{:?}({s})", other.kind()),
                _ => write!(f, "{:?}", other.kind()),
            },
        }
    }
}
