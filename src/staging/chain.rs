// src/staging/chain.rs

//! Ordered composition of resolvers.

use tracing::debug;

use crate::action::Action;
use crate::errors::ResolutionError;
use crate::staging::resolve::{Resolution, ResolveContext, ResolvedUnit, Resolver};
use crate::staging::resolvers::{BashResolver, LocalLinkResolver, StageResolver};
use crate::types::BackendKind;

/// A fixed pipeline of resolvers.
///
/// Each action is offered to the resolvers in order; the first one that does
/// not pass decides the result. An action that every resolver passes on is an
/// error. Order therefore encodes precedence and is fixed per backend.
#[derive(Debug, Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
    rewrite_prefixes: bool,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver with lower precedence than the existing ones.
    pub fn then(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Rewrite realm prefixes in every produced shell command using
    /// [`ResolveContext::replace_prefix`].
    pub fn with_prefix_rewrite(mut self) -> Self {
        self.rewrite_prefixes = true;
        self
    }

    /// The chain used for a given backend.
    ///
    /// - `Local`: literal-file links, then shell commands.
    /// - `Staging`: staging directives, then shell commands.
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Local => Self::new()
                .then(LocalLinkResolver)
                .then(BashResolver)
                .with_prefix_rewrite(),
            BackendKind::Staging => Self::new()
                .then(StageResolver)
                .then(BashResolver)
                .with_prefix_rewrite(),
        }
    }

    /// Names of the resolvers in precedence order.
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Resolve one action into zero or more units.
    pub fn resolve_action(
        &self,
        ctx: &ResolveContext,
        action: &Action,
    ) -> Result<Vec<ResolvedUnit>, ResolutionError> {
        for resolver in &self.resolvers {
            match resolver.resolve(ctx, action)? {
                Resolution::Pass => continue,
                Resolution::Resolved(units) => {
                    debug!(resolver = resolver.name(), %action, units = units.len(), "action resolved");
                    return Ok(self.finish(ctx, units));
                }
            }
        }

        Err(ResolutionError::Unresolved {
            action: action.to_string(),
        })
    }

    /// Resolve a task's actions, keeping their order and flattening the result.
    ///
    /// Fails on the first action that cannot be resolved; no partial output is
    /// returned.
    pub fn resolve(
        &self,
        ctx: &ResolveContext,
        actions: &[Action],
    ) -> Result<Vec<ResolvedUnit>, ResolutionError> {
        let mut units = Vec::with_capacity(actions.len());
        for action in actions {
            units.extend(self.resolve_action(ctx, action)?);
        }
        Ok(units)
    }

    fn finish(&self, ctx: &ResolveContext, units: Vec<ResolvedUnit>) -> Vec<ResolvedUnit> {
        if !self.rewrite_prefixes {
            return units;
        }

        units
            .into_iter()
            .map(|unit| match unit {
                ResolvedUnit::Command(cmd) => ResolvedUnit::Command(ctx.replace_prefix(&cmd)),
                directive => directive,
            })
            .collect()
    }
}
