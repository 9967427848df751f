// tests/domain_lifecycle.rs

use std::collections::HashSet;
use std::time::{Duration, Instant};

use stageflow::domain::{
    Always, Condition, ConditionExt, FnCondition, NModels, NTrajectories, Never, Task, TaskState,
    TasksFinished, Worker, WorkerState,
};
use stageflow::errors::StageflowError;
use stageflow::store::{FileKind, Store};
use stageflow_test_utils::builders::TaskBuilder;

fn run_to_done(store: &Store, task: Task) {
    let id = store.queue_task(task);
    store.transition_task(id, TaskState::Queued).unwrap();
    store.transition_task(id, TaskState::Running).unwrap();
    store.complete_task(id).unwrap();
}

#[test]
fn task_follows_lifecycle() {
    let mut task = Task::new(vec![]);
    assert_eq!(task.state(), TaskState::Created);

    task.transition(TaskState::Queued).unwrap();
    task.transition(TaskState::Running).unwrap();
    task.transition(TaskState::Done).unwrap();
    assert!(task.is_finished());

    let err = task.transition(TaskState::Running).unwrap_err();
    assert!(matches!(
        err,
        StageflowError::InvalidTransition { entity: "task", .. }
    ));
}

#[test]
fn task_cannot_skip_states() {
    let mut task = Task::new(vec![]);
    assert!(task.transition(TaskState::Running).is_err());
    assert!(task.transition(TaskState::Done).is_err());
    assert_eq!(task.state(), TaskState::Created);

    // Unresolvable tasks fail straight from created.
    task.transition(TaskState::Failed).unwrap();
    assert!(!task.recover());
    assert_eq!(task.state(), TaskState::Failed);
}

#[test]
fn task_ids_are_unique() {
    let a = Task::new(vec![]);
    let b = Task::new(vec![]);
    assert_ne!(a.id(), b.id());
}

#[test]
fn worker_assignment_and_release() {
    let now = Instant::now();
    let mut worker = Worker::new("w1", now);

    worker.assign(7).unwrap();
    assert_eq!(worker.state(), WorkerState::Running);
    assert_eq!(worker.current(), Some(7));
    assert!(worker.assign(8).is_err());

    assert_eq!(worker.release().unwrap(), Some(7));
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(worker.current(), None);
}

#[test]
fn dead_worker_comes_back_on_heartbeat() {
    let start = Instant::now();
    let mut worker = Worker::new("w1", start);
    worker.assign(3).unwrap();

    let later = start + Duration::from_secs(61);
    assert!(worker.is_stale(later, Duration::from_secs(60)));

    assert_eq!(worker.mark_dead(), Some(3));
    assert_eq!(worker.state(), WorkerState::Dead);
    assert!(!worker.is_stale(later, Duration::from_secs(60)));

    worker.heartbeat(later);
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(worker.last_seen(), later);
}

#[test]
fn heartbeat_never_moves_backwards() {
    let start = Instant::now();
    let mut worker = Worker::new("w1", start + Duration::from_secs(5));
    worker.heartbeat(start);
    assert_eq!(worker.last_seen(), start + Duration::from_secs(5));
}

#[test]
fn down_worker_stays_down() {
    let now = Instant::now();
    let mut worker = Worker::new("w1", now);
    worker.assign(1).unwrap();
    assert!(worker.shut_down().is_err());

    worker.release().unwrap();
    worker.shut_down().unwrap();
    worker.heartbeat(now + Duration::from_secs(1));
    assert_eq!(worker.state(), WorkerState::Down);
}

#[test]
fn trajectory_condition_counts_created_files() {
    let store = Store::new();
    let condition = NTrajectories(5);

    for i in 0..3 {
        run_to_done(&store, TaskBuilder::new().trajectory(&format!("traj{i}.dcd")).build());
    }
    // Queued but unfinished trajectories do not count.
    store.queue_task(TaskBuilder::new().trajectory("pending.dcd").build());

    assert!(!condition.check(&store));
    assert_eq!(condition.describe(&store), "#trajectories[3] >= 5");

    for i in 3..5 {
        run_to_done(&store, TaskBuilder::new().trajectory(&format!("traj{i}.dcd")).build());
    }
    assert!(condition.check(&store));
    assert!(!(condition + 1).check(&store));
}

#[test]
fn model_condition_tracks_model_outputs() {
    let store = Store::new();
    assert!(!NModels(1).check(&store));

    run_to_done(&store, TaskBuilder::new().model("model.npz").build());

    assert_eq!(store.model_count(), 1);
    assert!(NModels(1).check(&store));
    assert_eq!(store.trajectories(), 0);
}

#[test]
fn concurrent_model_completions_get_distinct_ids() {
    let store = Store::new();
    let ids: Vec<_> = (0..16)
        .map(|i| {
            let id = store.queue_task(TaskBuilder::new().model(&format!("m{i}.npz")).build());
            store.transition_task(id, TaskState::Queued).unwrap();
            store.transition_task(id, TaskState::Running).unwrap();
            id
        })
        .collect();

    std::thread::scope(|scope| {
        for id in ids {
            let store = store.clone();
            scope.spawn(move || store.complete_task(id).unwrap());
        }
    });

    let model_ids: HashSet<u64> = store.models.all().iter().map(|m| m.id).collect();
    assert_eq!(store.model_count(), 16);
    assert_eq!(model_ids, (1..=16).collect());
}

#[test]
fn tasks_finished_condition() {
    let store = Store::new();
    let done = Task::new(vec![]);
    let done_id = done.id();
    run_to_done(&store, done);
    let open_id = store.queue_task(Task::new(vec![]));

    assert!(TasksFinished::one(done_id).check(&store));
    assert!(!TasksFinished(vec![done_id, open_id]).check(&store));
    assert!(!TasksFinished::one(u64::MAX).check(&store));

    store.fail_task(open_id).unwrap();
    assert!(TasksFinished(vec![done_id, open_id]).check(&store));
}

#[test]
fn combinators() {
    let store = Store::new();

    assert!(Always.and(Always).check(&store));
    assert!(!Always.and(Never).check(&store));
    assert!(Never.or(Always).check(&store));
    assert!(Never.negate().check(&store));
    assert_eq!(Always.and(Never.negate()).describe(&store), "(always & !(never))");

    let empty = FnCondition::new("no tasks", |s: &Store| s.tasks.is_empty());
    assert!(empty.check(&store));
    store.queue_task(Task::new(vec![]));
    assert!(!empty.check(&store));
}

#[test]
fn store_tracks_output_files() {
    let store = Store::new();
    let task = TaskBuilder::new().trajectory("t.dcd").build();
    let id = task.id();
    store.queue_task(task);

    let record = store.files.find(|f| f.producer == Some(id)).unwrap();
    assert_eq!(record.kind, FileKind::Trajectory);
    assert_eq!(record.file.url(), "shared://t.dcd");
    assert!(!record.created);

    assert!(matches!(
        store.complete_task(id),
        Err(StageflowError::InvalidTransition { .. })
    ));
    assert!(matches!(
        store.transition_task(u64::MAX, TaskState::Queued),
        Err(StageflowError::TaskNotFound(_))
    ));
}

#[test]
fn worker_registration() {
    let store = Store::new();
    let now = Instant::now();

    store.register_worker("w1", now);
    store.register_worker("w1", now + Duration::from_secs(1));
    assert_eq!(store.workers.len(), 1);

    store.heartbeat("w1", now + Duration::from_secs(2)).unwrap();
    assert!(matches!(
        store.heartbeat("nope", now),
        Err(StageflowError::WorkerNotFound(_))
    ));

    store.assign_worker("w1", 42).unwrap();
    assert_eq!(store.release_worker_of(42).as_deref(), Some("w1"));
    assert_eq!(store.release_worker_of(42), None);
}
