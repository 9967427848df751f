#![allow(dead_code)]

use stageflow::action::{Action, FileRef, Realm};
use stageflow::config::{ConfigFile, RawConfigFile};
use stageflow::domain::{ResourceRequest, Task};
use stageflow::store::FileKind;
use stageflow::types::BackendKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn trigger_interval(mut self, value: &str) -> Self {
        self.config.engine.trigger_interval = value.to_string();
        self
    }

    pub fn worker_dead_time(mut self, value: &str) -> Self {
        self.config.engine.worker_dead_time = value.to_string();
        self
    }

    pub fn wait_poll_interval(mut self, value: &str) -> Self {
        self.config.engine.wait_poll_interval = value.to_string();
        self
    }

    pub fn max_trigger_iterations(mut self, value: usize) -> Self {
        self.config.engine.max_trigger_iterations = value;
        self
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend.kind = kind;
        self
    }

    pub fn staging_area(mut self, location: &str) -> Self {
        self.config.backend.staging_area_location = Some(location.to_string());
        self
    }

    pub fn shared_root(mut self, root: &str) -> Self {
        self.config.realms.shared = Some(root.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Task`.
pub struct TaskBuilder {
    actions: Vec<Action>,
    generator: Option<String>,
    output: Option<(Action, FileKind)>,
    resources: ResourceRequest,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            generator: None,
            output: None,
            resources: ResourceRequest::default(),
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn touch(self, url: &str) -> Self {
        self.action(Action::Touch(FileRef::parse(url).expect("valid url")))
    }

    pub fn generator(mut self, name: &str) -> Self {
        self.generator = Some(name.to_string());
        self
    }

    /// Mark the task as producing a trajectory at `shared://<name>`.
    pub fn trajectory(mut self, name: &str) -> Self {
        let target = FileRef::new(Realm::Shared, name);
        let action = Action::copy(FileRef::new(Realm::Worker, name), target);
        self.actions.push(action.clone());
        self.output = Some((action, FileKind::Trajectory));
        self
    }

    /// Mark the task as producing a model at `shared://<name>`.
    pub fn model(mut self, name: &str) -> Self {
        let action = Action::copy(
            FileRef::new(Realm::Worker, name),
            FileRef::new(Realm::Shared, name),
        );
        self.actions.push(action.clone());
        self.output = Some((action, FileKind::Model));
        self
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.resources.cores = cores;
        self
    }

    pub fn build(self) -> Task {
        let mut task = Task::new(self.actions).with_resources(self.resources);
        if let Some(generator) = self.generator {
            task = task.with_generator(generator);
        }
        if let Some((action, kind)) = self.output {
            task = task.with_output(action, kind);
        }
        task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}
