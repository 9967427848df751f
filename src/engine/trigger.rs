// src/engine/trigger.rs

use tracing::{debug, warn};

use crate::domain::event::{Event, EventContext};
use crate::store::Store;

/// Totals for one trigger pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub iterations: usize,
    pub events_fired: usize,
    pub events_failed: usize,
    pub events_retired: usize,
    pub events_added: usize,
    pub tasks_submitted: usize,
    pub hit_iteration_ceiling: bool,
}

/// Evaluate `events` against `store` until nothing new happens or
/// `max_iterations` iterations produced new work.
///
/// Within an iteration events are visited in registration order. Events
/// registered by a callback join the list after the iteration ends. Finished
/// events are removed. A callback error retires its event and the pass goes
/// on with the others.
pub fn run_pass(events: &mut Vec<Event>, store: &Store, max_iterations: usize) -> PassReport {
    let mut report = PassReport::default();
    let mut remaining = max_iterations;

    while remaining > 0 {
        report.iterations += 1;
        let mut spawned = Vec::new();
        let mut produced = false;

        for event in events.iter_mut() {
            if !event.is_alive(store) {
                continue;
            }

            let mut ctx = EventContext::new(store);
            match event.fire(&mut ctx) {
                Ok(true) => report.events_fired += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(event = event.name(), error = %err, "event logic failed; retiring event");
                    event.retire();
                    report.events_failed += 1;
                }
            }

            let (tasks, new_events) = ctx.into_parts();
            produced |= !tasks.is_empty() || !new_events.is_empty();
            report.tasks_submitted += tasks.len();
            spawned.extend(new_events);
        }

        let before = events.len();
        events.retain(|event| event.is_alive(store));
        report.events_retired += before - events.len();

        report.events_added += spawned.len();
        events.extend(spawned);

        if !produced {
            break;
        }
        remaining -= 1;
    }

    report.hit_iteration_ceiling = remaining == 0;
    if report.hit_iteration_ceiling {
        debug!(iterations = report.iterations, "trigger pass stopped at iteration ceiling");
    }
    report
}
