//! Command execution primitives with captured output.
//!
//! Nothing here returns an error for a non-zero exit: callers decide what a
//! failed process means. Spawn failures are folded into the output as well,
//! with exit code -1.

use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};

/// Captured result of an external process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CommandOutput {
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn spawn_failed(context: &str, err: std::io::Error) -> Self {
        Self {
            success: false,
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("Failed to run {}: {}", context, err),
        }
    }

    /// Error text: stderr when present, stdout otherwise, trimmed.
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }
}

/// Run a program with arguments, optionally in a directory, capturing output.
pub fn run_captured(program: &str, args: &[&str], dir: Option<&Path>) -> CommandOutput {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    match cmd.output() {
        Ok(out) => CommandOutput::from_output(out),
        Err(e) => CommandOutput::spawn_failed(program, e),
    }
}

/// Run a command string through the platform shell, capturing output.
pub fn run_shell(
    command: &str,
    current_dir: Option<&Path>,
    env: Option<&[(&str, &str)]>,
) -> CommandOutput {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };

    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }

    if let Some(env_pairs) = env {
        cmd.envs(env_pairs.iter().copied());
    }

    match cmd.output() {
        Ok(out) => CommandOutput::from_output(out),
        Err(e) => CommandOutput::spawn_failed("shell", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captured_collects_stdout() {
        let output = run_captured("echo", &["hello"], None);
        assert!(output.success);
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn run_captured_reports_missing_program() {
        let output = run_captured("nonexistent_command_xyz", &[], None);
        assert!(!output.success);
        assert_eq!(output.exit_code, -1);
        assert!(output.stderr.contains("nonexistent_command_xyz"));
    }

    #[cfg(unix)]
    #[test]
    fn run_shell_reports_exit_code_and_stderr() {
        let output = run_shell("echo oops >&2; exit 3", None, None);
        assert!(!output.success);
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.error_text(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn run_shell_passes_env() {
        let output = run_shell("printf %s \"$RIGGER_TEST_VALUE\"", None, Some(&[("RIGGER_TEST_VALUE", "42")]));
        assert_eq!(output.stdout, "42");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = CommandOutput {
            success: false,
            exit_code: 1,
            stdout: " stdout content \n".to_string(),
            stderr: "   ".to_string(),
        };
        assert_eq!(output.error_text(), "stdout content");
    }
}
