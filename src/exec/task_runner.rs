// src/exec/task_runner.rs

//! Runs one resolved task as a sequence of shell commands.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::worker::WorkerId;
use crate::exec::backend::{BackendEvent, ResolvedTask};

/// Run every command of `task` in order, stopping at the first failure, and
/// report `Started` followed by `Completed` or `Failed`.
///
/// Tasks containing staging directives are rejected; the shell cannot carry
/// them out.
pub async fn run_task(
    task: ResolvedTask,
    workdir: &Path,
    worker: Option<WorkerId>,
    events_tx: mpsc::Sender<BackendEvent>,
) {
    let id = task.task;
    let _ = events_tx
        .send(BackendEvent::Started { task: id, worker })
        .await;

    let outcome = match task.resources.walltime {
        Some(limit) => match tokio::time::timeout(limit, run_commands(&task, workdir)).await {
            Ok(res) => res,
            Err(_) => Err(anyhow::anyhow!("walltime of {limit:?} exceeded")),
        },
        None => run_commands(&task, workdir).await,
    };

    let event = match outcome {
        Ok(()) => {
            info!(task = id, "task finished");
            BackendEvent::Completed { task: id }
        }
        Err(err) => {
            error!(task = id, error = %err, "task execution error");
            BackendEvent::Failed {
                task: id,
                reason: format!("{err:#}"),
            }
        }
    };

    if events_tx.send(event).await.is_err() {
        debug!(task = id, "event receiver dropped before task outcome was reported");
    }
}

async fn run_commands(task: &ResolvedTask, workdir: &Path) -> Result<()> {
    let Some(commands) = task.commands() else {
        bail!("task {} contains staging directives, which the shell backend cannot run", task.task);
    };

    for command in commands {
        run_command(task, command, workdir).await?;
    }
    Ok(())
}

async fn run_command(task: &ResolvedTask, command: &str, workdir: &Path) -> Result<()> {
    info!(task = task.task, cmd = %command, "starting command");

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(workdir)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{command}` for task {}", task.task))?;

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let id = task.task;
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = id, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{command}` of task {}", task.task))?;

    if !status.success() {
        bail!("`{command}` exited with code {}", status.code().unwrap_or(-1));
    }
    Ok(())
}
