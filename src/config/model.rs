// src/config/model.rs

use serde::Deserialize;

use crate::action::Realm;
use crate::engine::EngineConfig;
use crate::staging::ResolveContext;
use crate::types::BackendKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// trigger_interval = "5s"
/// worker_dead_time = "60s"
/// max_trigger_iterations = 50
/// wait_poll_interval = "5s"
///
/// [backend]
/// kind = "staging"
/// staging_area_location = "/scratch/project/staging_area"
///
/// [realms]
/// shared = "/scratch/project"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub realms: RealmsSection,
}

/// `[engine]` section. Durations are strings like `"500ms"`, `"5s"`, `"2m"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_trigger_interval")]
    pub trigger_interval: String,

    #[serde(default = "default_worker_dead_time")]
    pub worker_dead_time: String,

    #[serde(default = "default_max_trigger_iterations")]
    pub max_trigger_iterations: usize,

    #[serde(default = "default_wait_poll_interval")]
    pub wait_poll_interval: String,
}

fn default_trigger_interval() -> String {
    "5s".to_string()
}

fn default_worker_dead_time() -> String {
    "60s".to_string()
}

fn default_max_trigger_iterations() -> usize {
    50
}

fn default_wait_poll_interval() -> String {
    "5s".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            trigger_interval: default_trigger_interval(),
            worker_dead_time: default_worker_dead_time(),
            max_trigger_iterations: default_max_trigger_iterations(),
            wait_poll_interval: default_wait_poll_interval(),
        }
    }
}

/// `[backend]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    #[serde(default)]
    pub kind: BackendKind,

    /// Physical location of the staging area. Required for `kind = "staging"`.
    #[serde(default)]
    pub staging_area_location: Option<String>,
}

/// `[realms]` section: filesystem roots substituted for realm prefixes in
/// shell commands. `worker://` and `file://` are always plain paths and
/// cannot be configured.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RealmsSection {
    #[serde(default)]
    pub shared: Option<String>,

    #[serde(default)]
    pub sandbox: Option<String>,

    #[serde(default)]
    pub staging: Option<String>,
}

impl RealmsSection {
    pub fn roots(&self) -> impl Iterator<Item = (Realm, &str)> {
        [
            (Realm::Shared, self.shared.as_deref()),
            (Realm::Sandbox, self.sandbox.as_deref()),
            (Realm::Staging, self.staging.as_deref()),
        ]
        .into_iter()
        .filter_map(|(realm, root)| root.map(|r| (realm, r)))
    }
}

/// Backend settings after validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub staging_area_location: Option<String>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>`, so every instance has
/// passed validation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineConfig,
    pub backend: BackendConfig,
    pub realms: RealmsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        engine: EngineConfig,
        backend: BackendConfig,
        realms: RealmsSection,
    ) -> Self {
        Self {
            engine,
            backend,
            realms,
        }
    }

    /// The resolution context described by `[backend]` and `[realms]`.
    pub fn resolve_context(&self) -> ResolveContext {
        let mut ctx = ResolveContext::new();
        if let Some(location) = &self.backend.staging_area_location {
            ctx = ctx.with_staging_area(location.clone());
        }
        for (realm, root) in self.realms.roots() {
            ctx = ctx.with_realm_root(realm, root);
        }
        ctx
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            EngineConfig::default(),
            BackendConfig::default(),
            RealmsSection::default(),
        )
    }
}
