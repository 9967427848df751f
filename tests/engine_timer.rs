// tests/engine_timer.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use stageflow::domain::{Event, FnCondition, Task, TaskState, TasksFinished};
use stageflow::engine::{Engine, EngineConfig};
use stageflow::errors::StageflowError;
use stageflow::store::Store;

fn fast_engine() -> Engine {
    Engine::new(
        Store::new(),
        EngineConfig {
            trigger_interval: Duration::from_millis(20),
            wait_poll_interval: Duration::from_millis(10),
            ..EngineConfig::default()
        },
    )
}

fn flagged_event(flag: &Arc<AtomicBool>) -> Event {
    let flag = Arc::clone(flag);
    Event::once(
        "flagged",
        FnCondition::new("flag set", move |_| flag.load(Ordering::SeqCst)),
        |ctx| {
            ctx.submit(Task::new(vec![]).with_generator("timer"));
            Ok(())
        },
    )
}

#[test]
fn run_requires_a_runtime() {
    let engine = fast_engine();
    assert!(matches!(engine.run(), Err(StageflowError::NoRuntime)));
    assert!(!engine.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timer_triggers_periodically_until_stopped() {
    init_tracing();
    let engine = fast_engine();
    let flag = Arc::new(AtomicBool::new(false));
    engine.add_event(flagged_event(&flag));
    assert_eq!(engine.store().tasks.len(), 0);

    assert!(engine.run().unwrap());
    assert!(!engine.run().unwrap(), "second start is a no-op");
    assert!(engine.is_running());

    flag.store(true, Ordering::SeqCst);
    with_timeout(async {
        while engine.store().tasks.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert_eq!(engine.active_events(), 0);

    assert!(engine.stop().await);
    assert!(!engine.stop().await);
    assert!(!engine.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wait_until_returns_once_condition_holds() {
    init_tracing();
    let engine = fast_engine();
    let store = engine.store().clone();
    let id = store.queue_task(Task::new(vec![]));

    let finisher = tokio::spawn({
        let store = store.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.transition_task(id, TaskState::Queued).unwrap();
            store.transition_task(id, TaskState::Running).unwrap();
            store.complete_task(id).unwrap();
        }
    });

    with_timeout(engine.wait_until(&TasksFinished::one(id)))
        .await
        .unwrap();
    assert_eq!(store.task_state(id), Some(TaskState::Done));
    finisher.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wait_until_triggers_pending_events() {
    init_tracing();
    let engine = fast_engine();
    let flag = Arc::new(AtomicBool::new(false));
    engine.add_event(flagged_event(&flag));
    flag.store(true, Ordering::SeqCst);

    let made_task = FnCondition::new("task submitted", |s: &Store| !s.tasks.is_empty());
    with_timeout(engine.wait_until(&made_task)).await.unwrap();

    assert_eq!(engine.active_events(), 0);
}

#[test]
fn blocking_wait_returns_immediately_when_condition_holds() {
    let engine = fast_engine();
    engine.wait_until_blocking(&FnCondition::new("always", |_| true));
}
