// src/staging/mod.rs

//! Staging-action resolution.
//!
//! Turns abstract [`Action`](crate::action::Action)s into units a backend can
//! execute: literal shell commands or structured staging directives.
//!
//! - [`rules`] is the static rule table keyed by
//!   `(kind, source realm, target realm, is_folder)`.
//! - [`resolve`] defines the [`Resolver`] trait and the resolution types.
//! - [`resolvers`] contains the stage, bash and local-link resolvers.
//! - [`chain`] composes resolvers into the per-backend [`ResolverChain`].

pub mod chain;
pub mod resolve;
pub mod resolvers;
pub mod rules;

pub use chain::ResolverChain;
pub use resolve::{Resolution, ResolveContext, ResolvedUnit, Resolver, StagingDirective};
pub use resolvers::{BashResolver, LocalLinkResolver, StageResolver};
pub use rules::{KindRules, RuleKey, StageMode, StageRule};
