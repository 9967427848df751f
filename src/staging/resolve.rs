// src/staging/resolve.rs

//! Core types of action resolution.

use std::collections::BTreeMap;
use std::fmt;

use crate::action::{Action, ActionKind, FileRef, Realm};
use crate::errors::ResolutionError;

/// A structured staging request understood by a batch backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagingDirective {
    pub source: String,
    pub target: String,
    /// Backend staging action name, e.g. `Transfer` or `Copy`.
    pub action: String,
}

/// One backend-executable unit produced from an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedUnit {
    Command(String),
    Directive(StagingDirective),
}

impl ResolvedUnit {
    pub fn as_command(&self) -> Option<&str> {
        match self {
            ResolvedUnit::Command(cmd) => Some(cmd),
            ResolvedUnit::Directive(_) => None,
        }
    }

    pub fn as_directive(&self) -> Option<&StagingDirective> {
        match self {
            ResolvedUnit::Directive(d) => Some(d),
            ResolvedUnit::Command(_) => None,
        }
    }
}

impl fmt::Display for ResolvedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedUnit::Command(cmd) => write!(f, "bash: {cmd}"),
            ResolvedUnit::Directive(d) => {
                write!(f, "stage: {} {} -> {}", d.action, d.source, d.target)
            }
        }
    }
}

/// Outcome of a single resolver looking at a single action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not handled here; the next resolver in the chain gets a chance.
    Pass,
    Resolved(Vec<ResolvedUnit>),
}

/// A single step of a resolver chain.
///
/// Resolvers must be pure: the same action and context always give the same
/// result.
pub trait Resolver: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        ctx: &ResolveContext,
        action: &Action,
    ) -> Result<Resolution, ResolutionError>;
}

/// Scheduler-provided context for resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// Location of the backend staging area, e.g.
    /// `sandbox:///workers/staging_area/`.
    staging_area_location: Option<String>,
    /// Physical root directory per realm, used to rewrite realm prefixes in
    /// shell commands.
    realm_roots: BTreeMap<Realm, String>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staging_area(mut self, location: impl Into<String>) -> Self {
        self.staging_area_location = Some(location.into());
        self
    }

    pub fn with_realm_root(mut self, realm: Realm, root: impl Into<String>) -> Self {
        self.realm_roots.insert(realm, root.into());
        self
    }

    pub fn staging_area_location(&self) -> Option<&str> {
        self.staging_area_location.as_deref()
    }

    pub fn realm_root(&self, realm: Realm) -> Option<&str> {
        self.realm_roots.get(&realm).map(String::as_str)
    }

    /// Rewrite a location lying under the staging area to `staging://<rel>`.
    ///
    /// Returns `None` if there is no staging area or the location is outside
    /// of it.
    pub fn canonical_staging(&self, url: &str) -> Option<String> {
        let area = self.staging_area_location.as_deref()?;
        let relative = url.strip_prefix(area)?;
        Some(format!(
            "{}{}",
            Realm::Staging.prefix(),
            relative.trim_start_matches('/')
        ))
    }

    /// Replace realm prefixes in a shell command with physical paths.
    ///
    /// `worker://` and `file://` always collapse to the bare path (the worker
    /// directory is the command's working directory, file paths are literal).
    /// Other realms are joined onto their configured root, or reduced to the
    /// realm-relative path when none is configured.
    pub fn replace_prefix(&self, command: &str) -> String {
        command
            .split(' ')
            .map(|token| self.physical_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn physical_token(&self, token: &str) -> String {
        let Ok(file) = FileRef::parse(token) else {
            return token.to_string();
        };

        match file.realm() {
            Realm::Worker | Realm::File => file.path().to_string(),
            realm => match self.realm_root(realm) {
                Some(root) => join_root(root, file.path()),
                None => file.path().to_string(),
            },
        }
    }
}

fn join_root(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if root.is_empty() {
        path.to_string()
    } else {
        format!("{root}/{path}")
    }
}

/// Location string as a shell command sees it.
///
/// The worker realm is the command's working directory, so its prefix is
/// dropped. Literal file paths are only unwrapped for `Transfer`; the other
/// transactions keep the prefix for later rewriting.
pub(crate) fn shell_location(file: &FileRef, kind: ActionKind) -> String {
    match file.realm() {
        Realm::Worker => file.path().to_string(),
        Realm::File if kind == ActionKind::Transfer => file.path().to_string(),
        _ => file.url(),
    }
}
