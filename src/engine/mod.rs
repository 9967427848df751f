// src/engine/mod.rs

//! Trigger engine for stageflow.
//!
//! The engine owns the registered events and the shared store, and:
//! - runs trigger passes that fire events whose conditions hold
//!   ([`trigger`]),
//! - detects lost workers and recovers their tasks after every pass
//!   ([`liveness`]),
//! - optionally re-triggers itself on a periodic timer and lets callers
//!   block until a condition holds ([`timer`]).
//!
//! Passes are serialized: the event list lock is held for the whole pass, so
//! a timer tick and a manual call never interleave.

pub mod liveness;
pub mod timer;
pub mod trigger;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::event::Event;
use crate::domain::task::TaskId;
use crate::domain::worker::WorkerId;
use crate::store::{Store, lock};

pub use liveness::{LivenessReport, scan_workers};
pub use trigger::{PassReport, run_pass};

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Period of the background trigger timer.
    pub trigger_interval: Duration,
    /// Heartbeat age after which a worker is considered lost.
    pub worker_dead_time: Duration,
    /// Upper bound on iterations within one trigger pass.
    pub max_trigger_iterations: usize,
    /// How often `wait_until` re-checks its condition.
    pub wait_poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_interval: Duration::from_secs(5),
            worker_dead_time: Duration::from_secs(60),
            max_trigger_iterations: 50,
            wait_poll_interval: Duration::from_secs(5),
        }
    }
}

/// Everything that happened during one call to [`Engine::trigger`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerReport {
    pub pass: PassReport,
    pub workers_lost: Vec<WorkerId>,
    pub tasks_recovered: Vec<TaskId>,
}

struct Shared {
    store: Store,
    config: EngineConfig,
    events: Mutex<Vec<Event>>,
    timer: Mutex<Option<timer::TimerHandle>>,
}

/// Cheaply cloneable handle to one engine instance.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.shared.config)
            .field("events", &self.active_events())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(store: Store, config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                events: Mutex::new(Vec::new()),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Register an event and run a trigger pass.
    pub fn add_event(&self, event: Event) -> TriggerReport {
        self.add_events([event])
    }

    /// Register several events (in the given order) and run one trigger pass.
    pub fn add_events(&self, events: impl IntoIterator<Item = Event>) -> TriggerReport {
        {
            let mut registered = lock(&self.shared.events);
            for event in events {
                debug!(event = event.name(), id = event.id(), "event registered");
                registered.push(event);
            }
        }
        self.trigger()
    }

    /// Number of events that are still registered.
    pub fn active_events(&self) -> usize {
        lock(&self.shared.events).len()
    }

    pub fn event_names(&self) -> Vec<String> {
        lock(&self.shared.events)
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }

    /// Run one trigger pass followed by a worker liveness scan.
    pub fn trigger(&self) -> TriggerReport {
        let mut events = lock(&self.shared.events);
        let store = &self.shared.store;
        let config = &self.shared.config;

        let pass = run_pass(&mut events, store, config.max_trigger_iterations);
        let liveness = scan_workers(store, config.worker_dead_time, Instant::now());

        if pass.events_fired > 0 || !liveness.workers_lost.is_empty() {
            info!(
                fired = pass.events_fired,
                submitted = pass.tasks_submitted,
                retired = pass.events_retired,
                lost = liveness.workers_lost.len(),
                "trigger pass"
            );
        }

        TriggerReport {
            pass,
            workers_lost: liveness.workers_lost,
            tasks_recovered: liveness.tasks_recovered,
        }
    }
}
