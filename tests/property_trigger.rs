// tests/property_trigger.rs

use proptest::prelude::*;
use stageflow::domain::{Always, Event, Next, Task};
use stageflow::engine::{Engine, EngineConfig};
use stageflow::store::Store;

fn engine_with(max_iterations: usize) -> Engine {
    Engine::new(
        Store::new(),
        EngineConfig {
            max_trigger_iterations: max_iterations,
            ..EngineConfig::default()
        },
    )
}

proptest! {
    #[test]
    fn endless_producer_is_cut_at_the_ceiling(max in 1usize..64) {
        let engine = engine_with(max);

        let report = engine.add_event(Event::new("flood", Always, |ctx| {
            ctx.submit(Task::new(vec![]));
            Ok(Next::wait(Always))
        }));

        prop_assert_eq!(report.pass.iterations, max);
        prop_assert_eq!(report.pass.tasks_submitted, max);
        prop_assert!(report.pass.hit_iteration_ceiling);
        prop_assert_eq!(engine.store().tasks.len(), max);

        // The next pass is bounded the same way.
        let again = engine.trigger();
        prop_assert_eq!(again.pass.iterations, max);
        prop_assert_eq!(engine.store().tasks.len(), 2 * max);
    }

    #[test]
    fn finite_producer_settles_below_the_ceiling(max in 1usize..64, rounds in 0usize..64) {
        let engine = engine_with(max);

        let mut left = rounds;
        let report = engine.add_event(Event::new("bounded", Always, move |ctx| {
            if left == 0 {
                return Ok(Next::Finish);
            }
            left -= 1;
            ctx.submit(Task::new(vec![]));
            Ok(Next::wait(Always))
        }));

        let submitted = rounds.min(max);
        prop_assert_eq!(report.pass.tasks_submitted, submitted);
        prop_assert!(report.pass.iterations <= max);
        prop_assert_eq!(report.pass.hit_iteration_ceiling, rounds >= max);
    }
}
