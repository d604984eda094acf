//! Built-in task kinds.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::{Feedback, Task, TaskOutcome, TaskParams};
use crate::error::{Error, Result};
use crate::utils::command;

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

// ============================================================================
// mkdir
// ============================================================================

/// Create a directory (and missing parents).
///
/// Params: `path` (required), `ignore_existing` (flag).
pub struct MkdirTask;

impl Task for MkdirTask {
    fn description(&self) -> &str {
        "Create directory"
    }

    fn run(&self, params: &TaskParams, feedback: &mut dyn Feedback) -> Result<TaskOutcome> {
        let raw = match params.require_str("mkdir", "path") {
            Ok(raw) => raw,
            Err(outcome) => return Ok(outcome),
        };
        let path = expand_path(raw);

        if path.exists() {
            if !path.is_dir() {
                return Ok(TaskOutcome::failed(format!(
                    "Path exists and is not a directory: {}",
                    path.display()
                )));
            }
            if params.flag("ignore_existing") {
                feedback.message(&format!("Directory already exists: {}", path.display()));
                return Ok(TaskOutcome::ok());
            }
            return Ok(TaskOutcome::failed(format!(
                "Directory already exists: {}",
                path.display()
            )));
        }

        fs::create_dir_all(&path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", path.display())))
        })?;
        feedback.message(&format!("Created {}", path.display()));
        Ok(TaskOutcome::ok())
    }
}

// ============================================================================
// envcheck
// ============================================================================

/// Require one or more environment variables to be set.
///
/// Params: `envvar` (name or list of names).
pub struct EnvCheckTask;

impl Task for EnvCheckTask {
    fn description(&self) -> &str {
        "Check environment variables"
    }

    fn run(&self, params: &TaskParams, feedback: &mut dyn Feedback) -> Result<TaskOutcome> {
        let names = match params.require_list("envcheck", "envvar") {
            Ok(names) => names,
            Err(outcome) => return Ok(outcome),
        };

        for name in &names {
            if env::var_os(name).is_none() {
                return Ok(TaskOutcome::failed(format!(
                    "Environment variable {} is not set",
                    name
                )));
            }
            feedback.message(&format!("{} is set", name));
        }

        Ok(TaskOutcome::ok())
    }
}

// ============================================================================
// confirm
// ============================================================================

/// Ask the operator to confirm before the job continues. Only "yes" proceeds.
///
/// Params: `message` (required).
pub struct ConfirmTask;

impl Task for ConfirmTask {
    fn description(&self) -> &str {
        "Confirm with operator"
    }

    fn run(&self, params: &TaskParams, feedback: &mut dyn Feedback) -> Result<TaskOutcome> {
        let message = match params.require_str("confirm", "message") {
            Ok(message) => message,
            Err(outcome) => return Ok(outcome),
        };

        match feedback.ask(&format!("{} [yes/no]", message))? {
            Some(answer) if answer.trim() == "yes" => Ok(TaskOutcome::ok()),
            Some(answer) => Ok(TaskOutcome::failed(format!(
                "Operator declined ({}): {}",
                if answer.is_empty() { "<empty>" } else { answer.as_str() },
                message
            ))),
            None => Ok(TaskOutcome::failed(format!("No answer received: {}", message))),
        }
    }
}

// ============================================================================
// shell
// ============================================================================

/// Run one or more shell commands in order.
///
/// Params: `command` (command or list of commands, required), `cwd`,
/// `ignore_errors` (flag: record failures but keep going and succeed).
pub struct ShellTask;

impl Task for ShellTask {
    fn description(&self) -> &str {
        "Run shell commands"
    }

    fn run(&self, params: &TaskParams, feedback: &mut dyn Feedback) -> Result<TaskOutcome> {
        let commands = match params.require_list("shell", "command") {
            Ok(commands) => commands,
            Err(outcome) => return Ok(outcome),
        };
        let cwd = params.str("cwd").map(expand_path);
        if let Some(dir) = &cwd {
            if !dir.is_dir() {
                return Ok(TaskOutcome::failed(format!(
                    "Working directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        let ignore_errors = params.flag("ignore_errors");

        let mut ignored = Vec::new();
        for cmd in &commands {
            feedback.message(&format!("$ {}", cmd));
            let output = command::run_shell(cmd, cwd.as_deref(), None);
            if !output.stdout.trim().is_empty() {
                feedback.message(output.stdout.trim_end());
            }

            if !output.success {
                let reason = format!(
                    "'{}' exited with {}: {}",
                    cmd,
                    output.exit_code,
                    output.error_text()
                );
                if !ignore_errors {
                    return Ok(TaskOutcome::failed(reason));
                }
                feedback.message(&reason);
                ignored.push(reason);
            }
        }

        if ignored.is_empty() {
            Ok(TaskOutcome::ok())
        } else {
            Ok(TaskOutcome {
                success: true,
                detail: Some(format!("ignored {} failure(s): {}", ignored.len(), ignored.join("; "))),
            })
        }
    }
}
