use clap::{Args, Subcommand};
use serde::Serialize;

use rigger::task::{TaskKindInfo, TaskRegistry};

use super::CmdResult;

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List registered task kinds and their aliases
    List,
}

#[derive(Debug, Serialize)]
pub struct TaskListOutput {
    command: String,
    tasks: Vec<TaskKindInfo>,
}

pub fn run_json(args: TaskArgs) -> CmdResult<TaskListOutput> {
    match args.command {
        TaskCommand::List => Ok((
            TaskListOutput {
                command: "task.list".to_string(),
                tasks: TaskRegistry::builtin().describe(),
            },
            0,
        )),
    }
}
