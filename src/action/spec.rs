// src/action/spec.rs

//! TOML description of action lists.
//!
//! ```toml
//! [[action]]
//! kind = "copy"
//! source = "shared://data/in/"
//! target = "worker://in/"
//!
//! [[action]]
//! kind = "path_export"
//! path = "/opt/md/bin"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::action::{Action, ActionKind, FileRef};
use crate::errors::{ResolutionError, Result};

/// A whole file of `[[action]]` entries.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActionFile {
    #[serde(default)]
    pub action: Vec<ActionSpec>,
}

/// One `[[action]]` entry as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    pub kind: ActionKind,

    /// Source location (or the only location for remove/touch/make_dir).
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub target: Option<String>,

    /// Directory for `path_export`.
    #[serde(default)]
    pub path: Option<String>,

    /// Treat the source as a folder even without a trailing slash.
    #[serde(default)]
    pub folder: bool,
}

impl ActionFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let file: ActionFile = toml::from_str(&contents)?;
        Ok(file)
    }

    /// Convert every entry into an [`Action`], preserving order.
    pub fn into_actions(self) -> std::result::Result<Vec<Action>, ResolutionError> {
        self.action.into_iter().map(Action::try_from).collect()
    }
}

impl TryFrom<ActionSpec> for Action {
    type Error = ResolutionError;

    fn try_from(spec: ActionSpec) -> std::result::Result<Self, Self::Error> {
        if spec.kind == ActionKind::PathExport {
            let path = spec.path.ok_or_else(|| {
                ResolutionError::InvalidAction("path_export requires `path`".to_string())
            })?;
            return Ok(Action::PathExport(path));
        }

        let source = spec.source.as_deref().ok_or_else(|| {
            ResolutionError::InvalidAction(format!("{:?} requires `source`", spec.kind))
        })?;
        let mut source = FileRef::parse(source)?;
        if spec.folder {
            source = source.as_folder();
        }

        if !spec.kind.is_transaction() {
            return Ok(match spec.kind {
                ActionKind::Remove => Action::Remove(source),
                ActionKind::Touch => Action::Touch(source),
                _ => Action::MakeDir(source),
            });
        }

        let target = spec.target.as_deref().ok_or_else(|| {
            ResolutionError::InvalidAction(format!("{:?} requires `target`", spec.kind))
        })?;
        let target = FileRef::parse(target)?;

        Ok(match spec.kind {
            ActionKind::Copy => Action::copy(source, target),
            ActionKind::Move => Action::mv(source, target),
            ActionKind::Link => Action::link(source, target),
            _ => Action::transfer(source, target),
        })
    }
}
