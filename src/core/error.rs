use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidJson,

    TaskNotFound,
    JobEmpty,

    VcsCommandFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::TaskNotFound => "task.not_found",
            ErrorCode::JobEmpty => "job.empty",

            ErrorCode::VcsCommandFailed => "vcs.command_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNotFoundDetails {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsCommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub exit_code: i32,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            format!("Invalid argument: {}", problem),
            details,
        )
    }

    pub fn validation_invalid_json(
        err: impl std::fmt::Display,
        context: Option<String>,
        input: Option<String>,
    ) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
            "input": input,
        });

        Self::new(
            ErrorCode::ValidationInvalidJson,
            format!("Invalid input: {}", err),
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            to_details(ConfigInvalidJsonDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem: problem.into(),
            }),
        )
    }

    pub fn task_not_found(task: impl Into<String>, step: Option<usize>, available: Vec<String>) -> Self {
        let task = task.into();
        let message = match step {
            Some(index) => format!("Unknown task '{}' at step {}", task, index),
            None => format!("Unknown task '{}'", task),
        };

        Self::new(
            ErrorCode::TaskNotFound,
            message,
            to_details(TaskNotFoundDetails {
                task,
                step,
                available,
            }),
        )
        .with_hint("Run 'rigger task list' to see available tasks")
    }

    pub fn job_empty(name: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::JobEmpty,
            format!("Job '{}' declares no steps", name.into()),
            Value::Object(serde_json::Map::new()),
        )
    }

    pub fn vcs_command_failed(details: VcsCommandFailedDetails) -> Self {
        let message = if details.stderr.trim().is_empty() {
            format!("'{}' failed with exit code {}", details.command, details.exit_code)
        } else {
            format!("'{}' failed: {}", details.command, details.stderr.trim())
        };

        Self::new(ErrorCode::VcsCommandFailed, message, to_details(details))
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Detail string suitable for a report entry: message plus the underlying cause when present.
    pub fn detail(&self) -> String {
        match self.details.get("error").and_then(Value::as_str) {
            Some(cause) if !cause.is_empty() && cause != self.message => {
                format!("{}: {}", self.message, cause)
            }
            _ => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_lists_available_tasks() {
        let err = Error::task_not_found("mkdri", Some(2), vec!["mkdir".to_string()]);

        assert_eq!(err.code, ErrorCode::TaskNotFound);
        assert_eq!(err.message, "Unknown task 'mkdri' at step 2");
        assert_eq!(err.details["available"][0], "mkdir");
        assert_eq!(err.hints.len(), 1);
    }

    #[test]
    fn vcs_command_failed_prefers_stderr_in_message() {
        let err = Error::vcs_command_failed(VcsCommandFailedDetails {
            command: "git remote".to_string(),
            path: None,
            exit_code: 128,
            stderr: "fatal: not a git repository\n".to_string(),
        });

        assert_eq!(err.message, "'git remote' failed: fatal: not a git repository");
        assert_eq!(err.details["exitCode"], 128);
    }

    #[test]
    fn detail_includes_io_cause() {
        let err = Error::internal_io("permission denied", Some("create dir".to_string()));
        assert_eq!(err.detail(), "IO error: permission denied");
    }
}
