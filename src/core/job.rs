//! Job runner: executes resolved task instances in order under one execution name.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::log_status;
use crate::output::ExecutionReport;
use crate::task::{Feedback, ResolvedJob, TaskInstance};

/// What the runner does after a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed step.
    #[default]
    Stop,
    /// Record the failure and run the remaining steps.
    Continue,
}

impl FailurePolicy {
    pub fn from_flag(continue_on_failure: bool) -> Self {
        if continue_on_failure {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Stop
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub execution: String,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub policy: FailurePolicy,
    /// Steps never started because the runner stopped early.
    pub not_run: usize,
    pub report: ExecutionReport,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.report.succeeded()
    }

    pub fn exit_code(&self) -> i32 {
        self.report.exit_code()
    }
}

/// Run every step of `job`, appending one report entry per executed step.
///
/// A task returning `Err` aborts the run and the error propagates.
pub fn run_job(job: ResolvedJob, policy: FailurePolicy, feedback: &mut dyn Feedback) -> Result<JobReport> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now().to_rfc3339();
    let total = job.steps.len();

    log_status!("job", "{} ({} steps, run {})", job.name, total, run_id);

    let report = run_steps(job.steps, policy, feedback)?;
    let not_run = total - report.len();

    if not_run > 0 {
        log_status!("job", "Stopped after failure, {} step(s) not run", not_run);
    }

    Ok(JobReport {
        execution: job.name,
        run_id,
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        policy,
        not_run,
        report,
    })
}

fn run_steps(
    steps: Vec<TaskInstance>,
    policy: FailurePolicy,
    feedback: &mut dyn Feedback,
) -> Result<ExecutionReport> {
    let mut report = ExecutionReport::new();
    let total = steps.len();

    for (index, step) in steps.into_iter().enumerate() {
        log_status!("job", "[{}/{}] {}", index + 1, total, step.description());

        let outcome = step.run(feedback)?;
        let success = outcome.success;
        report.record(step.description(), success, outcome.detail);

        if !success && policy == FailurePolicy::Stop {
            break;
        }
    }

    Ok(report)
}
