// tests/engine_liveness.rs

mod common;
use crate::common::init_tracing;

use std::time::{Duration, Instant};

use stageflow::domain::{Task, TaskState, WorkerState};
use stageflow::engine::{Engine, EngineConfig, scan_workers};
use stageflow::store::Store;

fn running_task_on(store: &Store, worker: &str) -> u64 {
    let id = store.queue_task(Task::new(vec![]));
    store.transition_task(id, TaskState::Queued).unwrap();
    store.transition_task(id, TaskState::Running).unwrap();
    store.assign_worker(worker, id).unwrap();
    id
}

#[test]
fn silent_worker_is_declared_dead_and_task_recovered() {
    init_tracing();
    let store = Store::new();
    let start = Instant::now();
    store.register_worker("w1", start);
    let task = running_task_on(&store, "w1");

    let report = scan_workers(&store, Duration::from_secs(60), start + Duration::from_secs(61));

    assert_eq!(report.workers_lost, vec!["w1".to_string()]);
    assert_eq!(report.tasks_recovered, vec![task]);
    assert_eq!(store.task_state(task), Some(TaskState::Created));

    let worker = store.workers.get("w1").unwrap();
    assert_eq!(worker.state(), WorkerState::Dead);
    assert_eq!(worker.current(), None);
}

#[test]
fn healthy_worker_is_left_alone() {
    let store = Store::new();
    let start = Instant::now();
    store.register_worker("w1", start);
    let task = running_task_on(&store, "w1");

    store.heartbeat("w1", start + Duration::from_secs(50)).unwrap();
    let report = scan_workers(&store, Duration::from_secs(60), start + Duration::from_secs(100));

    assert!(report.workers_lost.is_empty());
    assert_eq!(store.task_state(task), Some(TaskState::Running));
}

#[test]
fn scan_is_not_repeated_for_dead_workers() {
    let store = Store::new();
    let start = Instant::now();
    store.register_worker("w1", start);
    let later = start + Duration::from_secs(120);

    assert_eq!(scan_workers(&store, Duration::from_secs(60), later).workers_lost.len(), 1);
    assert!(scan_workers(&store, Duration::from_secs(60), later).workers_lost.is_empty());

    // Reconnecting brings the worker back.
    store.heartbeat("w1", later).unwrap();
    assert_eq!(store.workers.get("w1").unwrap().state(), WorkerState::Idle);
}

#[test]
fn down_worker_is_left_untouched_by_scan() {
    init_tracing();
    let store = Store::new();
    let start = Instant::now();
    store.register_worker("w1", start);
    store.workers.update("w1", |w| w.shut_down()).unwrap().unwrap();

    let report = scan_workers(&store, Duration::from_secs(60), start + Duration::from_secs(600));

    assert!(report.workers_lost.is_empty());
    assert!(report.tasks_recovered.is_empty());
    assert_eq!(store.workers.get("w1").unwrap().state(), WorkerState::Down);
}

#[test]
fn finished_task_is_not_recovered() {
    let store = Store::new();
    let start = Instant::now();
    store.register_worker("w1", start);
    let task = running_task_on(&store, "w1");
    store.complete_task(task).unwrap();

    let report = scan_workers(&store, Duration::from_secs(60), start + Duration::from_secs(61));

    assert_eq!(report.workers_lost.len(), 1);
    assert!(report.tasks_recovered.is_empty());
    assert_eq!(store.task_state(task), Some(TaskState::Done));
}

#[test]
fn trigger_runs_liveness_scan() {
    init_tracing();
    let engine = Engine::new(
        Store::new(),
        EngineConfig {
            worker_dead_time: Duration::from_millis(10),
            ..EngineConfig::default()
        },
    );
    let store = engine.store().clone();
    store.register_worker("w1", Instant::now());
    let task = running_task_on(&store, "w1");

    std::thread::sleep(Duration::from_millis(50));
    let report = engine.trigger();

    assert_eq!(report.workers_lost, vec!["w1".to_string()]);
    assert_eq!(report.tasks_recovered, vec![task]);
    assert_eq!(store.created_tasks().len(), 1);
}
