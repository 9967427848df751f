// src/config/mod.rs

//! Configuration for stageflow.
//!
//! - [`model`] holds the raw TOML mapping and the validated `ConfigFile`.
//! - [`loader`] reads files from disk.
//! - [`validate`] turns a `RawConfigFile` into a `ConfigFile`.
//! - [`duration`] parses the human-readable durations used by `[engine]`.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    BackendConfig, BackendSection, ConfigFile, EngineSection, RawConfigFile, RealmsSection,
};
