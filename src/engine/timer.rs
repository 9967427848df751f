// src/engine/timer.rs

//! Periodic re-triggering and condition waits.
//!
//! Trigger passes are synchronous and take a blocking lock, so the async
//! side always runs them through `spawn_blocking`.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::condition::Condition;
use crate::errors::{Result, StageflowError};
use crate::store::lock;

use super::Engine;

pub(super) struct TimerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl Engine {
    /// Start the periodic trigger timer on the current tokio runtime.
    ///
    /// Returns `Ok(false)` if the timer is already running. The first pass
    /// happens one interval after the call.
    pub fn run(&self) -> Result<bool> {
        let mut timer = lock(&self.shared.timer);
        if timer.is_some() {
            return Ok(false);
        }

        let handle = tokio::runtime::Handle::try_current().map_err(|_| StageflowError::NoRuntime)?;
        let (stop_tx, stop_rx) = watch::channel(false);
        let period = self.config().trigger_interval;
        let join = handle.spawn(trigger_loop(self.clone(), period, stop_rx));

        info!(?period, "trigger timer started");
        *timer = Some(TimerHandle { stop_tx, join });
        Ok(true)
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.timer).is_some()
    }

    /// Stop the timer and wait for it to exit.
    ///
    /// A pass that is already running completes first. Returns `false` if no
    /// timer was running.
    pub async fn stop(&self) -> bool {
        let timer = lock(&self.shared.timer).take();
        let Some(TimerHandle { stop_tx, join }) = timer else {
            return false;
        };

        let _ = stop_tx.send(true);
        if let Err(err) = join.await {
            warn!(error = %err, "trigger timer exited abnormally");
        }
        info!("trigger timer stopped");
        true
    }

    /// Trigger and sleep until `condition` holds.
    ///
    /// There is no timeout; wrap the future in `tokio::time::timeout` if one
    /// is needed.
    pub async fn wait_until(&self, condition: &dyn Condition) -> Result<()> {
        loop {
            if condition.check(self.store()) {
                return Ok(());
            }

            let engine = self.clone();
            tokio::task::spawn_blocking(move || engine.trigger())
                .await
                .map_err(|err| StageflowError::Other(err.into()))?;

            if condition.check(self.store()) {
                return Ok(());
            }
            debug!(waiting_on = %condition.describe(self.store()), "condition not met");
            time::sleep(self.config().wait_poll_interval).await;
        }
    }

    /// Blocking variant of [`Engine::wait_until`] for callers without a
    /// runtime.
    pub fn wait_until_blocking(&self, condition: &dyn Condition) {
        while !condition.check(self.store()) {
            self.trigger();
            if condition.check(self.store()) {
                break;
            }
            std::thread::sleep(self.config().wait_poll_interval);
        }
    }
}

async fn trigger_loop(engine: Engine, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let pass_engine = engine.clone();
                match tokio::task::spawn_blocking(move || pass_engine.trigger()).await {
                    Ok(report) => debug!(?report, "timer pass finished"),
                    Err(err) => error!(error = %err, "timer pass panicked"),
                }
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
    debug!("trigger loop exiting");
}
