//! Task plugin contract.
//!
//! A task is a named, parameterized unit of operator work. Tasks report
//! expected failures (a missing parameter, an unmet precondition, a declined
//! confirmation) as a failed [`TaskOutcome`]; an `Err` is reserved for
//! conditions the task could not anticipate, and aborts the job.

mod builtin;
mod feedback;
mod registry;

pub use builtin::*;
pub use feedback::*;
pub use registry::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

// ============================================================================
// Parameters
// ============================================================================

/// A single parameter value as declared in a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `key: null` or `key: ~`; only presence matters.
    Empty,
    Bool(bool),
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Normalize to a list: a scalar becomes a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            ParamValue::Empty => Vec::new(),
            ParamValue::Bool(value) => vec![value.to_string()],
            ParamValue::Scalar(value) => vec![value.clone()],
            ParamValue::List(values) => values.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Parameter mapping owned by one task instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskParams(BTreeMap<String, ParamValue>);

impl TaskParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Presence-only flag: true whenever the key is declared, whatever its value.
    pub fn flag(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Single-or-list normalization for parameters that accept multiplicity.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(ParamValue::to_list)
    }

    /// A required string parameter, or the failed outcome the task should return.
    pub fn require_str(&self, task: &str, key: &str) -> std::result::Result<&str, TaskOutcome> {
        match self.str(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(TaskOutcome::missing_parameter(task, key)),
        }
    }

    /// A required list parameter (scalar accepted), or the failed outcome to return.
    pub fn require_list(&self, task: &str, key: &str) -> std::result::Result<Vec<String>, TaskOutcome> {
        match self.list(key) {
            Some(values) if !values.is_empty() => Ok(values),
            _ => Err(TaskOutcome::missing_parameter(task, key)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of running a task: success plus an optional human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TaskOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(reason.into()),
        }
    }

    pub fn missing_parameter(task: &str, key: &str) -> Self {
        Self::failed(format!("{}: {} is a required parameter", task, key))
    }
}

// ============================================================================
// Contract
// ============================================================================

/// The polymorphic surface every task kind implements.
pub trait Task: Send + Sync {
    /// Human-readable identity of the task kind, used in reports and logs.
    fn description(&self) -> &str;

    fn run(&self, params: &TaskParams, feedback: &mut dyn Feedback) -> Result<TaskOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: &str) -> TaskParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserializes_every_value_shape() {
        let p = params(r#"{"path": "/tmp/x", "force": null, "quiet": false, "vars": ["A", "B"]}"#);

        assert_eq!(p.get("path"), Some(&ParamValue::Scalar("/tmp/x".to_string())));
        assert_eq!(p.get("force"), Some(&ParamValue::Empty));
        assert_eq!(p.get("quiet"), Some(&ParamValue::Bool(false)));
        assert_eq!(p.list("vars"), Some(vec!["A".to_string(), "B".to_string()]));
    }

    #[test]
    fn flag_is_presence_only() {
        let p = params(r#"{"ignore_existing": false}"#);
        assert!(p.flag("ignore_existing"));
        assert!(!p.flag("other"));
    }

    #[test]
    fn scalar_normalizes_to_single_element_list() {
        let p = TaskParams::new().with("envvar", "HOME");
        assert_eq!(p.list("envvar"), Some(vec!["HOME".to_string()]));
    }

    #[test]
    fn require_str_reports_missing_key() {
        let p = TaskParams::new();
        let outcome = p.require_str("mkdir", "path").unwrap_err();

        assert!(!outcome.success);
        assert_eq!(outcome.detail.as_deref(), Some("mkdir: path is a required parameter"));
    }

    #[test]
    fn require_str_rejects_list_value() {
        let p = TaskParams::new().with("path", vec!["a", "b"]);
        assert!(p.require_str("mkdir", "path").is_err());
    }

    #[test]
    fn require_list_rejects_empty_list() {
        let p = params(r#"{"envvar": []}"#);
        assert!(p.require_list("envcheck", "envvar").is_err());
    }
}
