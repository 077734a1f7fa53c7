#![allow(dead_code)]

use slotdag::config::{
    ConfigFile, ConfigSection, DefaultSection, SlotConfig, TaskConfig, validate_config,
};
use slotdag::dag::{Scheduler, Slot, TaskSpec};

/// Builder for `TaskSpec` to simplify test setup.
///
/// Defaults: slot `"cpu"`, priority 0, capacity 1, no command, no edges.
pub struct TaskSpecBuilder {
    spec: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: TaskSpec::new(name, "cpu"),
        }
    }

    pub fn slot(mut self, slot: &str) -> Self {
        self.spec.slot = slot.to_string();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.spec.priority = priority;
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.spec.capacity = capacity;
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.spec.cmd = Some(cmd.to_string());
        self
    }

    pub fn from(mut self, pred: &str) -> Self {
        self.spec.from.push(pred.to_string());
        self
    }

    pub fn to(mut self, succ: &str) -> Self {
        self.spec.to.push(succ.to_string());
        self
    }

    pub fn build(self) -> TaskSpec {
        self.spec
    }
}

/// Register slots and tasks on a fresh scheduler, without tidying.
pub fn scheduler_with(slots: &[(&str, u32)], tasks: Vec<TaskSpec>) -> Scheduler {
    let mut scheduler = Scheduler::new("test");
    for (name, capacity) in slots {
        scheduler
            .add_slot(Slot::new(*name, *capacity))
            .expect("failed to add slot");
    }
    for task in tasks {
        scheduler.add_task(task).expect("failed to add task");
    }
    scheduler
}

/// Same as [`scheduler_with`], then tidy.
pub fn tidied_scheduler(slots: &[(&str, u32)], tasks: Vec<TaskSpec>) -> Scheduler {
    let mut scheduler = scheduler_with(slots, tasks);
    scheduler.tidy().expect("tidy failed");
    scheduler
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile {
                config: ConfigSection::default(),
                default: DefaultSection::default(),
                slot: Vec::new(),
                task: Vec::new(),
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.config.config.id = id.to_string();
        self
    }

    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.config.tick_interval_ms = ms;
        self
    }

    pub fn default_slot(mut self, slot: &str) -> Self {
        self.config.default.slot = Some(slot.to_string());
        self
    }

    pub fn with_slot(mut self, name: &str, capacity: u32) -> Self {
        self.config.slot.push(SlotConfig {
            name: name.to_string(),
            capacity,
        });
        self
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn build(self) -> ConfigFile {
        validate_config(&self.config).expect("Failed to build valid config from builder");
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskConfig {
                name: name.to_string(),
                slot: None,
                priority: None,
                capacity: None,
                cmd: None,
                to: vec![],
                from: vec![],
            },
        }
    }

    pub fn slot(mut self, slot: &str) -> Self {
        self.task.slot = Some(slot.to_string());
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.task.priority = Some(priority);
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.task.capacity = Some(capacity);
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn from(mut self, pred: &str) -> Self {
        self.task.from.push(pred.to_string());
        self
    }

    pub fn to(mut self, succ: &str) -> Self {
        self.task.to.push(succ.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
