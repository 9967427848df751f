// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{BackendConfig, ConfigFile, RawConfigFile};
use crate::engine::EngineConfig;
use crate::errors::{Result, StageflowError};
use crate::types::BackendKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = StageflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let engine = validate_engine(&raw)?;
        let backend = validate_backend(&raw)?;
        validate_realms(&raw)?;
        Ok(ConfigFile::new_unchecked(engine, backend, raw.realms))
    }
}

fn validate_engine(cfg: &RawConfigFile) -> Result<EngineConfig> {
    let section = &cfg.engine;

    if section.max_trigger_iterations == 0 {
        return Err(StageflowError::ConfigError(
            "[engine].max_trigger_iterations must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(EngineConfig {
        trigger_interval: positive_duration("trigger_interval", &section.trigger_interval)?,
        worker_dead_time: positive_duration("worker_dead_time", &section.worker_dead_time)?,
        max_trigger_iterations: section.max_trigger_iterations,
        wait_poll_interval: positive_duration("wait_poll_interval", &section.wait_poll_interval)?,
    })
}

fn positive_duration(key: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| StageflowError::ConfigError(format!("[engine].{key}: {e}")))?;
    if duration.is_zero() {
        return Err(StageflowError::ConfigError(format!(
            "[engine].{key} must be greater than zero"
        )));
    }
    Ok(duration)
}

fn validate_backend(cfg: &RawConfigFile) -> Result<BackendConfig> {
    let section = &cfg.backend;
    let location = section
        .staging_area_location
        .as_deref()
        .map(str::trim)
        .filter(|loc| !loc.is_empty());

    if section.kind == BackendKind::Staging && location.is_none() {
        return Err(StageflowError::ConfigError(
            "[backend].staging_area_location is required when kind = \"staging\"".to_string(),
        ));
    }

    Ok(BackendConfig {
        kind: section.kind,
        staging_area_location: location.map(str::to_string),
    })
}

fn validate_realms(cfg: &RawConfigFile) -> Result<()> {
    for (realm, root) in cfg.realms.roots() {
        if root.contains(char::is_whitespace) {
            return Err(StageflowError::ConfigError(format!(
                "[realms].{} root must not contain whitespace (got {root:?})",
                realm.scheme()
            )));
        }
    }
    Ok(())
}
