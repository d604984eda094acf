pub type CmdResult<T> = rigger::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod config;
pub mod job;
pub mod repo;
pub mod task;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run_json($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (rigger::Result<serde_json::Value>, i32) {
    crate::tty::status("rigger is working...");

    match command {
        crate::Commands::Task(args) => dispatch!(args, task),
        crate::Commands::Job(args) => dispatch!(args, global, job),
        crate::Commands::Repo(args) => dispatch!(args, global, repo),
        crate::Commands::Config(args) => dispatch!(args, global, config),

        // Special case: List prints help instead of JSON
        crate::Commands::List => {
            let err = rigger::Error::validation_invalid_argument(
                "output_mode",
                "List command uses raw output mode",
                None,
                None,
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}
