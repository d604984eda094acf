use clap::{Args, Subcommand};
use serde::Serialize;

use rigger::defaults;
use rigger::job::{self, FailurePolicy, JobReport};
use rigger::task::{ConsoleFeedback, Feedback, JobSpec, ResolvedJob, SilentFeedback, TaskRegistry};

use super::CmdResult;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    command: JobCommand,
}

#[derive(Subcommand)]
enum JobCommand {
    /// Load and resolve a job without running any step
    Validate {
        /// Job spec: inline JSON, @file, a file path, or - for stdin
        spec: String,
    },
    /// Run a job's steps in order
    Run {
        /// Job spec: inline JSON, @file, a file path, or - for stdin
        spec: String,

        /// Execution name (overrides the name in the spec)
        #[arg(long)]
        name: Option<String>,

        /// Keep running after a failed step
        #[arg(long)]
        continue_on_failure: bool,

        /// Suppress task progress messages; confirmations go unanswered
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct StepInfo {
    index: usize,
    task: String,
    description: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobOutput {
    Validate {
        command: String,
        execution: String,
        #[serde(rename = "continueOnFailure")]
        continue_on_failure: bool,
        steps: Vec<StepInfo>,
    },
    Run {
        command: String,
        #[serde(flatten)]
        result: JobReport,
    },
}

pub fn run(args: JobArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<JobOutput> {
    match args.command {
        JobCommand::Validate { spec } => validate(&spec),
        JobCommand::Run {
            spec,
            name,
            continue_on_failure,
            quiet,
        } => run_job(&spec, name, continue_on_failure, quiet),
    }
}

fn resolve(spec: &str, name: Option<String>) -> rigger::Result<ResolvedJob> {
    let mut job = JobSpec::load(spec)?;
    if let Some(name) = name {
        job.name = Some(name);
    }
    TaskRegistry::builtin().resolve(&job)
}

fn validate(spec: &str) -> CmdResult<JobOutput> {
    let resolved = resolve(spec, None)?;

    let steps = resolved
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| StepInfo {
            index,
            task: step.kind.clone(),
            description: step.description().to_string(),
        })
        .collect();

    Ok((
        JobOutput::Validate {
            command: "job.validate".to_string(),
            execution: resolved.name,
            continue_on_failure: resolved.continue_on_failure,
            steps,
        },
        0,
    ))
}

fn run_job(
    spec: &str,
    name: Option<String>,
    continue_on_failure: bool,
    quiet: bool,
) -> CmdResult<JobOutput> {
    let resolved = resolve(spec, name)?;

    let policy = FailurePolicy::from_flag(
        continue_on_failure
            || resolved.continue_on_failure
            || defaults::load_defaults().jobs.continue_on_failure,
    );

    if !quiet && !crate::tty::is_stdin_tty() {
        crate::tty::status("stdin is not a terminal; confirmations read piped input");
    }

    let mut console;
    let mut silent = SilentFeedback;
    let feedback: &mut dyn Feedback = if quiet {
        &mut silent
    } else {
        console = ConsoleFeedback::console(Some(resolved.name.clone()));
        &mut console
    };

    let result = job::run_job(resolved, policy, feedback)?;
    let exit_code = result.exit_code();

    Ok((
        JobOutput::Run {
            command: "job.run".to_string(),
            result,
        },
        exit_code,
    ))
}
