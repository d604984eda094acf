use clap::{CommandFactory, Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{config, job, repo, task};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "rigger")]
#[command(version = VERSION)]
#[command(about = "Run declarative task jobs and fan git operations out across repositories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect registered task kinds
    Task(task::TaskArgs),
    /// Validate and run task jobs
    Job(job::JobArgs),
    /// Apply status/remotes/fetch/push/pull across repositories
    #[command(visible_alias = "repos")]
    Repo(repo::RepoArgs),
    /// Manage global rigger configuration
    Config(config::ConfigArgs),
    /// List available commands (alias for --help)
    List,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    if matches!(cli.command, Commands::List) {
        let mut cmd = Cli::command();
        if cmd.print_help().is_err() {
            return std::process::ExitCode::from(1);
        }
        println!();
        return std::process::ExitCode::SUCCESS;
    }

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
