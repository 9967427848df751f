// src/staging/resolvers.rs

//! The concrete resolvers a chain is built from.

use tracing::trace;

use crate::action::{Action, ActionKind, FileRef, Realm};
use crate::errors::ResolutionError;
use crate::staging::resolve::{
    Resolution, ResolveContext, ResolvedUnit, Resolver, StagingDirective, shell_location,
};
use crate::staging::rules::{self, RuleKey, StageMode};

fn unsupported(key: RuleKey) -> ResolutionError {
    ResolutionError::Unsupported {
        kind: key.kind,
        source_realm: key.source,
        target_realm: key.target,
        is_folder: key.is_folder,
    }
}

/// Turns transactions the backend can stage into [`StagingDirective`]s.
///
/// `Bash`-mode transactions and all non-transaction actions are passed on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageResolver;

impl Resolver for StageResolver {
    fn name(&self) -> &'static str {
        "stage"
    }

    fn resolve(
        &self,
        ctx: &ResolveContext,
        action: &Action,
    ) -> Result<Resolution, ResolutionError> {
        let Some((source, target)) = action.transaction() else {
            return Ok(Resolution::Pass);
        };
        let kind = action.kind();

        // The backend addresses staged files by their staging-area name, not by
        // the physical location they were written to.
        let source = match ctx.canonical_staging(&source.url()) {
            Some(url) => {
                let staged = FileRef::parse(&url)?;
                if source.is_folder() { staged.as_folder() } else { staged }
            }
            None => source.clone(),
        };

        let key = RuleKey {
            kind,
            source: source.realm(),
            target: target.realm(),
            is_folder: source.is_folder(),
        };

        match rules::lookup(key) {
            StageMode::Stage => {
                let Some(meta) = rules::kind_rules(kind) else {
                    return Err(unsupported(key));
                };
                let directive = StagingDirective {
                    source: shell_location(&source, kind),
                    target: shell_location(target, kind),
                    action: meta.backend_action.to_string(),
                };
                trace!(%action, ?directive, "staged");
                Ok(Resolution::Resolved(vec![ResolvedUnit::Directive(directive)]))
            }
            StageMode::Bash => Ok(Resolution::Pass),
            StageMode::Unsupported => Err(unsupported(key)),
        }
    }
}

/// Turns actions into literal shell commands.
///
/// Transactions still have to be feasible according to the rule table; a
/// `Stage`-mode transaction is run through its shell form when nothing
/// upstream staged it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BashResolver;

impl Resolver for BashResolver {
    fn name(&self) -> &'static str {
        "bash"
    }

    fn resolve(
        &self,
        _ctx: &ResolveContext,
        action: &Action,
    ) -> Result<Resolution, ResolutionError> {
        let kind = action.kind();
        let command = match action {
            Action::PathExport(path) => format!("export PATH={path}:$PATH"),
            Action::Remove(file) => {
                let path = shell_location(file, kind);
                if file.is_folder() {
                    format!("rm -r {path}")
                } else {
                    format!("rm {path}")
                }
            }
            Action::Touch(file) => format!("touch {}", shell_location(file, kind)),
            Action::MakeDir(file) => format!("mkdir -p {}", shell_location(file, kind)),
            Action::Copy { source, target }
            | Action::Move { source, target }
            | Action::Link { source, target }
            | Action::Transfer { source, target } => {
                let key = RuleKey {
                    kind,
                    source: source.realm(),
                    target: target.realm(),
                    is_folder: source.is_folder(),
                };
                if rules::lookup(key) == StageMode::Unsupported {
                    return Err(unsupported(key));
                }
                let cmd = rules::kind_rules(kind)
                    .and_then(|meta| meta.bash_cmd)
                    .ok_or(ResolutionError::NoShellForm { kind })?;
                format!(
                    "{cmd} {} {}",
                    shell_location(source, kind),
                    shell_location(target, kind)
                )
            }
        };

        trace!(%action, %command, "bash");
        Ok(Resolution::Resolved(vec![ResolvedUnit::Command(command)]))
    }
}

/// Local-only handling of transactions that touch literal file paths.
///
/// A literal file moving into another realm is hard-linked into place; a file
/// leaving for a literal path is symlinked back. Everything else passes. Only
/// combinations the rule table lists are linked.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLinkResolver;

impl Resolver for LocalLinkResolver {
    fn name(&self) -> &'static str {
        "local-link"
    }

    fn resolve(
        &self,
        _ctx: &ResolveContext,
        action: &Action,
    ) -> Result<Resolution, ResolutionError> {
        let Some((source, target)) = action.transaction() else {
            return Ok(Resolution::Pass);
        };

        let from_file = source.realm() == Realm::File;
        let to_file = target.realm() == Realm::File;
        if !from_file && !to_file {
            return Ok(Resolution::Pass);
        }

        let key = RuleKey {
            kind: action.kind(),
            source: source.realm(),
            target: target.realm(),
            is_folder: source.is_folder(),
        };
        if rules::lookup(key) == StageMode::Unsupported {
            return Err(unsupported(key));
        }

        let command = match (from_file, to_file) {
            (true, false) => {
                let src = source.path();
                let tgt = shell_location(target, ActionKind::Transfer);
                if src == tgt {
                    return Ok(Resolution::Pass);
                }
                format!("ln {src} {tgt}")
            }
            (false, true) => format!(
                "ln -s {} {}",
                shell_location(source, ActionKind::Transfer),
                target.path()
            ),
            _ => return Ok(Resolution::Pass),
        };

        trace!(%action, %command, "local link");
        Ok(Resolution::Resolved(vec![ResolvedUnit::Command(command)]))
    }
}
