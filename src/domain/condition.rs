// src/domain/condition.rs

//! Predicates over the store.
//!
//! Conditions are evaluated by the engine on every trigger pass and by
//! [`Engine::wait_until`](crate::engine::Engine::wait_until). They must be
//! cheap and free of side effects; evaluating one twice against the same
//! store gives the same answer.

use std::fmt;
use std::ops::Add;
use std::sync::Arc;

use crate::domain::task::{TaskId, TaskState};
use crate::store::Store;

pub trait Condition: fmt::Debug + Send + Sync {
    fn check(&self, store: &Store) -> bool;

    /// Human-readable form including the current observed value.
    fn describe(&self, store: &Store) -> String;
}

impl<C: Condition + ?Sized> Condition for Box<C> {
    fn check(&self, store: &Store) -> bool {
        (**self).check(store)
    }

    fn describe(&self, store: &Store) -> String {
        (**self).describe(store)
    }
}

impl<C: Condition + ?Sized> Condition for Arc<C> {
    fn check(&self, store: &Store) -> bool {
        (**self).check(store)
    }

    fn describe(&self, store: &Store) -> String {
        (**self).describe(store)
    }
}

/// Combinators available on every condition.
pub trait ConditionExt: Condition + Sized + 'static {
    fn and(self, other: impl Condition + 'static) -> AllOf {
        AllOf::new(vec![Box::new(self), Box::new(other)])
    }

    fn or(self, other: impl Condition + 'static) -> AnyOf {
        AnyOf::new(vec![Box::new(self), Box::new(other)])
    }

    fn negate(self) -> Not {
        Not(Box::new(self))
    }
}

impl<C: Condition + Sized + 'static> ConditionExt for C {}

/// At least `number` trajectories exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NTrajectories(pub usize);

impl Condition for NTrajectories {
    fn check(&self, store: &Store) -> bool {
        store.trajectories() >= self.0
    }

    fn describe(&self, store: &Store) -> String {
        format!("#trajectories[{}] >= {}", store.trajectories(), self.0)
    }
}

/// Shift the threshold, e.g. "ten more than the last time this fired".
impl Add<usize> for NTrajectories {
    type Output = NTrajectories;

    fn add(self, rhs: usize) -> NTrajectories {
        NTrajectories(self.0 + rhs)
    }
}

/// At least `number` models exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NModels(pub usize);

impl Condition for NModels {
    fn check(&self, store: &Store) -> bool {
        store.model_count() >= self.0
    }

    fn describe(&self, store: &Store) -> String {
        format!("#models[{}] >= {}", store.model_count(), self.0)
    }
}

impl Add<usize> for NModels {
    type Output = NModels;

    fn add(self, rhs: usize) -> NModels {
        NModels(self.0 + rhs)
    }
}

/// Every listed task is done or failed. An unknown id never counts as finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksFinished(pub Vec<TaskId>);

impl TasksFinished {
    pub fn one(id: TaskId) -> Self {
        Self(vec![id])
    }

    fn finished(&self, store: &Store) -> usize {
        self.0
            .iter()
            .filter(|id| store.task_state(**id).is_some_and(TaskState::is_finished))
            .count()
    }
}

impl Condition for TasksFinished {
    fn check(&self, store: &Store) -> bool {
        self.finished(store) == self.0.len()
    }

    fn describe(&self, store: &Store) -> String {
        format!("tasks finished[{}] of {}", self.finished(store), self.0.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Always;

impl Condition for Always {
    fn check(&self, _store: &Store) -> bool {
        true
    }

    fn describe(&self, _store: &Store) -> String {
        "always".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Never;

impl Condition for Never {
    fn check(&self, _store: &Store) -> bool {
        false
    }

    fn describe(&self, _store: &Store) -> String {
        "never".to_string()
    }
}

#[derive(Debug)]
pub struct AllOf(Vec<Box<dyn Condition>>);

impl AllOf {
    pub fn new(conditions: Vec<Box<dyn Condition>>) -> Self {
        Self(conditions)
    }
}

impl Condition for AllOf {
    fn check(&self, store: &Store) -> bool {
        self.0.iter().all(|c| c.check(store))
    }

    fn describe(&self, store: &Store) -> String {
        join(&self.0, store, " & ")
    }
}

#[derive(Debug)]
pub struct AnyOf(Vec<Box<dyn Condition>>);

impl AnyOf {
    pub fn new(conditions: Vec<Box<dyn Condition>>) -> Self {
        Self(conditions)
    }
}

impl Condition for AnyOf {
    fn check(&self, store: &Store) -> bool {
        self.0.iter().any(|c| c.check(store))
    }

    fn describe(&self, store: &Store) -> String {
        join(&self.0, store, " | ")
    }
}

#[derive(Debug)]
pub struct Not(pub Box<dyn Condition>);

impl Condition for Not {
    fn check(&self, store: &Store) -> bool {
        !self.0.check(store)
    }

    fn describe(&self, store: &Store) -> String {
        format!("!({})", self.0.describe(store))
    }
}

fn join(conditions: &[Box<dyn Condition>], store: &Store, sep: &str) -> String {
    let parts: Vec<String> = conditions.iter().map(|c| c.describe(store)).collect();
    format!("({})", parts.join(sep))
}

type Predicate = Box<dyn Fn(&Store) -> bool + Send + Sync>;

/// A condition backed by an arbitrary closure.
pub struct FnCondition {
    label: String,
    predicate: Predicate,
}

impl FnCondition {
    pub fn new(
        label: impl Into<String>,
        predicate: impl Fn(&Store) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for FnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Condition for FnCondition {
    fn check(&self, store: &Store) -> bool {
        (self.predicate)(store)
    }

    fn describe(&self, _store: &Store) -> String {
        self.label.clone()
    }
}
