// src/lib.rs

pub mod action;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod staging;
pub mod store;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::ActionFile;
use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::domain::{Always, Event, Task, TaskState, TasksFinished};
use crate::engine::Engine;
use crate::exec::{Dispatcher, ExecutorOptions, ShellBackend, apply_events};
use crate::staging::{ResolverChain, StageMode, rules};
use crate::store::Store;

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    match args.command {
        Command::Check => print_config(&cfg),
        Command::Rules { supported } => print_rules(supported),
        Command::Resolve { actions, backend } => resolve_actions(&cfg, &actions, backend)?,
        Command::Exec { actions, workdir } => exec_actions(&cfg, &actions, workdir).await?,
    }
    Ok(())
}

/// Load the named config, or the default one if it exists.
fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return Ok(load_and_validate(path)?);
    }

    let default = default_config_path();
    if default.exists() {
        Ok(load_and_validate(&default)?)
    } else {
        debug!(path = %default.display(), "no config file; using defaults");
        Ok(ConfigFile::default())
    }
}

fn print_config(cfg: &ConfigFile) {
    println!("stageflow config");
    println!("  engine.trigger_interval = {:?}", cfg.engine.trigger_interval);
    println!("  engine.worker_dead_time = {:?}", cfg.engine.worker_dead_time);
    println!(
        "  engine.max_trigger_iterations = {}",
        cfg.engine.max_trigger_iterations
    );
    println!("  engine.wait_poll_interval = {:?}", cfg.engine.wait_poll_interval);
    println!("  backend.kind = {}", cfg.backend.kind);
    if let Some(location) = &cfg.backend.staging_area_location {
        println!("  backend.staging_area_location = {location}");
    }
    for (realm, root) in cfg.realms.roots() {
        println!("  realms.{} = {root}", realm.scheme());
    }
}

fn print_rules(supported_only: bool) {
    for rule in rules::all_rules() {
        if supported_only && rule.mode == StageMode::Unsupported {
            continue;
        }
        let key = rule.key;
        println!(
            "{:<9} {:<6} {:<8} -> {:<8} {}",
            format!("{:?}", key.kind).to_lowercase(),
            if key.is_folder { "folder" } else { "file" },
            key.source,
            key.target,
            rule.mode
        );
    }
}

fn resolve_actions(
    cfg: &ConfigFile,
    path: &Path,
    backend: Option<types::BackendKind>,
) -> Result<()> {
    let actions = ActionFile::load(path)?.into_actions()?;
    let kind = backend.unwrap_or(cfg.backend.kind);
    let chain = ResolverChain::for_backend(kind);
    info!(backend = %kind, resolvers = ?chain.names(), actions = actions.len(), "resolving");

    for unit in chain.resolve(&cfg.resolve_context(), &actions)? {
        println!("{unit}");
    }
    Ok(())
}

async fn exec_actions(cfg: &ConfigFile, path: &Path, workdir: PathBuf) -> Result<()> {
    let actions = ActionFile::load(path)?.into_actions()?;

    let store = Store::new();
    let engine = Engine::new(store.clone(), cfg.engine);

    let (events_tx, events_rx) = mpsc::channel(64);
    let backend = ShellBackend::new(
        ExecutorOptions {
            workdir,
            ..ExecutorOptions::default()
        },
        events_tx,
    );
    let mut dispatcher = Dispatcher::new(store.clone(), cfg.resolve_context(), backend);
    let pump = tokio::spawn(apply_events(store.clone(), events_rx));

    let task = Task::new(actions).with_generator("cli");
    let id = task.id();
    let mut pending = Some(task);
    engine.add_event(Event::once("submit", Always, move |ctx| {
        if let Some(task) = pending.take() {
            ctx.submit(task);
        }
        Ok(())
    }));

    let summary = dispatcher.dispatch().await?;
    if let Some((task, err)) = summary.rejected.first() {
        pump.abort();
        bail!("task {task} rejected: {err}");
    }

    engine.wait_until(&TasksFinished::one(id)).await?;
    pump.abort();

    match store.task_state(id) {
        Some(TaskState::Done) => {
            info!(task = id, "all actions executed");
            Ok(())
        }
        state => bail!("task {id} did not complete (state: {state:?})"),
    }
}
