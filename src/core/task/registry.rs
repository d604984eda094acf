use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ConfirmTask, EnvCheckTask, Feedback, MkdirTask, ShellTask, Task, TaskOutcome, TaskParams};
use crate::error::{Error, Result};

// ============================================================================
// Job description
// ============================================================================

/// One declared step: a registered task kind plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(alias = "type")]
    pub task: String,
    #[serde(default, skip_serializing_if = "TaskParams::is_empty")]
    pub params: TaskParams,
    /// Overrides the task kind's description in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TaskDescriptor {
    pub fn new(task: impl Into<String>, params: TaskParams) -> Self {
        Self {
            task: task.into(),
            params,
            label: None,
        }
    }
}

/// A declarative job: an ordered list of steps run under one execution name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub continue_on_failure: bool,
    pub steps: Vec<TaskDescriptor>,
}

/// Accepted job document shapes: a full job object or a bare list of steps.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JobDocument {
    Job(JobSpec),
    Steps(Vec<TaskDescriptor>),
}

impl JobSpec {
    /// Load a job from inline JSON, `@file`, a file path, or `-` for stdin.
    pub fn load(spec: &str) -> Result<Self> {
        crate::config::load_spec::<JobDocument>(spec, "parse job").map(Into::into)
    }
}

impl From<JobDocument> for JobSpec {
    fn from(doc: JobDocument) -> Self {
        match doc {
            JobDocument::Job(spec) => spec,
            JobDocument::Steps(steps) => JobSpec {
                name: None,
                continue_on_failure: false,
                steps,
            },
        }
    }
}

// ============================================================================
// Instances
// ============================================================================

/// A descriptor bound to a live task object. Owns its parameters.
pub struct TaskInstance {
    pub kind: String,
    pub label: Option<String>,
    pub params: TaskParams,
    task: Box<dyn Task>,
}

impl TaskInstance {
    pub fn new(kind: impl Into<String>, task: Box<dyn Task>, params: TaskParams) -> Self {
        Self {
            kind: kind.into(),
            label: None,
            params,
            task,
        }
    }

    pub fn description(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.task.description())
    }

    pub fn run(&self, feedback: &mut dyn Feedback) -> Result<TaskOutcome> {
        self.task.run(&self.params, feedback)
    }
}

impl std::fmt::Debug for TaskInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskInstance")
            .field("kind", &self.kind)
            .field("description", &self.description())
            .field("params", &self.params)
            .finish()
    }
}

/// A job whose every step resolved to a registered task.
#[derive(Debug)]
pub struct ResolvedJob {
    pub name: String,
    pub continue_on_failure: bool,
    pub steps: Vec<TaskInstance>,
}

// ============================================================================
// Registry
// ============================================================================

pub type TaskFactory = fn() -> Box<dyn Task>;

/// Listing entry for `task list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskKindInfo {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Maps task names to factories. Names are matched after snake_case normalization.
#[derive(Default)]
pub struct TaskRegistry {
    factories: BTreeMap<String, TaskFactory>,
    aliases: BTreeMap<String, String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in task kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register("mkdir", || Box::new(MkdirTask))
            .register("envcheck", || Box::new(EnvCheckTask))
            .register("confirm", || Box::new(ConfirmTask))
            .register("shell", || Box::new(ShellTask));
        registry
            .alias("make_dir", "mkdir")
            .alias("makedir", "mkdir")
            .alias("check_env", "envcheck")
            .alias("env_check", "envcheck")
            .alias("prompt", "confirm")
            .alias("sh", "shell");
        registry
    }

    pub fn normalize(name: &str) -> String {
        name.trim().to_snake_case()
    }

    pub fn register(&mut self, name: &str, factory: TaskFactory) -> &mut Self {
        let key = Self::normalize(name);
        self.aliases.remove(&key);
        self.factories.insert(key, factory);
        self
    }

    /// Register `alias` as another name for an already-registered task.
    /// Aliases for unknown targets are ignored.
    pub fn alias(&mut self, alias: &str, target: &str) -> &mut Self {
        let target = Self::normalize(target);
        let alias = Self::normalize(alias);
        if self.factories.contains_key(&target) && !self.factories.contains_key(&alias) {
            self.aliases.insert(alias, target);
        }
        self
    }

    fn canonical(&self, name: &str) -> Option<String> {
        let key = Self::normalize(name);
        if self.factories.contains_key(&key) {
            return Some(key);
        }
        self.aliases.get(&key).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    /// Canonical task names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn describe(&self) -> Vec<TaskKindInfo> {
        self.factories
            .iter()
            .map(|(name, factory)| TaskKindInfo {
                name: name.clone(),
                description: factory().description().to_string(),
                aliases: self
                    .aliases
                    .iter()
                    .filter(|(_, target)| *target == name)
                    .map(|(alias, _)| alias.clone())
                    .collect(),
            })
            .collect()
    }

    /// Bind one descriptor to a fresh task object.
    pub fn instantiate(&self, descriptor: &TaskDescriptor, step: Option<usize>) -> Result<TaskInstance> {
        let kind = self
            .canonical(&descriptor.task)
            .ok_or_else(|| Error::task_not_found(descriptor.task.clone(), step, self.names()))?;
        let factory = self.factories[&kind];

        Ok(TaskInstance {
            kind,
            label: descriptor.label.clone(),
            params: descriptor.params.clone(),
            task: factory(),
        })
    }

    /// Resolve every step up front. Any unknown task rejects the whole job.
    pub fn resolve(&self, job: &JobSpec) -> Result<ResolvedJob> {
        let name = job
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "job".to_string());

        if job.steps.is_empty() {
            return Err(Error::job_empty(name));
        }

        let steps = job
            .steps
            .iter()
            .enumerate()
            .map(|(index, descriptor)| self.instantiate(descriptor, Some(index)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedJob {
            name,
            continue_on_failure: job.continue_on_failure,
            steps,
        })
    }
}
