// src/domain/event.rs

//! Conditional reactions.
//!
//! An [`Event`] waits on a [`Condition`]. When the condition holds, the
//! event's logic runs once with an [`EventContext`], may submit tasks or
//! register further events, and then says what to wait for next. An event is
//! finished once its logic returns [`Next::Finish`] or any of its `until`
//! conditions holds; finished events never fire again.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::condition::Condition;
use crate::domain::task::{Task, TaskId};
use crate::store::Store;

pub type EventId = u64;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// What an event does after firing.
#[derive(Debug)]
pub enum Next {
    /// Fire again once this condition holds.
    Wait(Arc<dyn Condition>),
    /// Retire the event.
    Finish,
}

impl Next {
    pub fn wait(condition: impl Condition + 'static) -> Self {
        Next::Wait(Arc::new(condition))
    }
}

type Logic = Box<dyn FnMut(&mut EventContext<'_>) -> anyhow::Result<Next> + Send>;

/// Handle given to event logic while it runs.
pub struct EventContext<'a> {
    store: &'a Store,
    submitted: Vec<TaskId>,
    spawned: Vec<Event>,
}

impl<'a> EventContext<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            submitted: Vec::new(),
            spawned: Vec::new(),
        }
    }

    pub fn store(&self) -> &Store {
        self.store
    }

    /// Hand a task to the store for dispatch.
    pub fn submit(&mut self, task: Task) -> TaskId {
        let id = self.store.queue_task(task);
        self.submitted.push(id);
        id
    }

    /// Register another event. It is picked up after the current iteration.
    pub fn add_event(&mut self, event: Event) {
        self.spawned.push(event);
    }

    pub fn submitted(&self) -> &[TaskId] {
        &self.submitted
    }

    pub fn produced_work(&self) -> bool {
        !self.submitted.is_empty() || !self.spawned.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<TaskId>, Vec<Event>) {
        (self.submitted, self.spawned)
    }
}

pub struct Event {
    id: EventId,
    name: String,
    when: Arc<dyn Condition>,
    until: Vec<Box<dyn Condition>>,
    logic: Logic,
    finished: bool,
    fired: usize,
}

impl Event {
    /// An event whose logic decides what to wait for after each firing.
    ///
    /// The logic runs while the engine holds its event list locked. Register
    /// follow-up events through [`EventContext::add_event`]; calling
    /// `add_event` or `trigger` on the engine from inside the logic deadlocks.
    pub fn new(
        name: impl Into<String>,
        when: impl Condition + 'static,
        logic: impl FnMut(&mut EventContext<'_>) -> anyhow::Result<Next> + Send + 'static,
    ) -> Self {
        Self::armed(name.into(), Arc::new(when), Box::new(logic))
    }

    fn armed(name: String, when: Arc<dyn Condition>, logic: Logic) -> Self {
        Self {
            id: NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed),
            name,
            when,
            until: Vec::new(),
            logic,
            finished: false,
            fired: 0,
        }
    }

    /// An event that fires exactly once.
    pub fn once(
        name: impl Into<String>,
        when: impl Condition + 'static,
        mut logic: impl FnMut(&mut EventContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        Self::new(name, when, move |ctx| {
            logic(ctx)?;
            Ok(Next::Finish)
        })
    }

    /// An event that fires every time `when` holds, until one of its
    /// `until` conditions does.
    ///
    /// Without an `until` condition and with a `when` that stays true, the
    /// event fires on every iteration up to the pass ceiling.
    pub fn repeat(
        name: impl Into<String>,
        when: impl Condition + 'static,
        mut logic: impl FnMut(&mut EventContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        let when: Arc<dyn Condition> = Arc::new(when);
        let rearm = Arc::clone(&when);
        Self::armed(
            name.into(),
            when,
            Box::new(move |ctx: &mut EventContext<'_>| {
                logic(ctx)?;
                Ok(Next::Wait(Arc::clone(&rearm)))
            }),
        )
    }

    /// Finish the event as soon as `condition` holds, whether or not it fired.
    pub fn until(mut self, condition: impl Condition + 'static) -> Self {
        self.until.push(Box::new(condition));
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fired(&self) -> usize {
        self.fired
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Not finished and no `until` condition holds.
    pub fn is_alive(&self, store: &Store) -> bool {
        !self.finished && !self.until.iter().any(|c| c.check(store))
    }

    /// What the event is currently waiting for.
    pub fn waiting_on(&self, store: &Store) -> String {
        self.when.describe(store)
    }

    /// Run the logic if the current condition holds.
    ///
    /// Returns whether the event fired. An error from the logic is returned
    /// as is; the caller decides what to do with the event.
    pub(crate) fn fire(&mut self, ctx: &mut EventContext<'_>) -> anyhow::Result<bool> {
        if self.finished || !self.when.check(ctx.store()) {
            return Ok(false);
        }

        self.fired += 1;
        match (self.logic)(ctx)? {
            Next::Wait(condition) => self.when = condition,
            Next::Finish => self.finished = true,
        }
        Ok(true)
    }

    pub(crate) fn retire(&mut self) {
        self.finished = true;
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("when", &self.when)
            .field("until", &self.until.len())
            .field("finished", &self.finished)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}
