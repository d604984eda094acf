use clap::{Args, Subcommand};
use serde::Serialize;

use rigger::defaults::{self, Defaults, RiggerConfig};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore rigger.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Write rigger.json with built-in defaults
    Init {
        /// Overwrite an existing rigger.json
        #[arg(long)]
        force: bool,
    },
    /// Reset configuration to built-in defaults (deletes rigger.json)
    Reset,
    /// Show the path to rigger.json
    Path,
}

#[derive(Debug, Default, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<RiggerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

pub fn run(args: ConfigArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Init { force } => init(force),
        ConfigCommand::Reset => reset(),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let output = if builtin {
        ConfigOutput {
            command: "config.show".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            ..ConfigOutput::default()
        }
    } else {
        ConfigOutput {
            command: "config.show".to_string(),
            config: Some(defaults::load_config()),
            ..ConfigOutput::default()
        }
    };
    Ok((output, 0))
}

fn init(force: bool) -> CmdResult<ConfigOutput> {
    let exists = defaults::config_exists();
    let create = force || !exists;

    if create {
        defaults::save_config(&RiggerConfig::default())?;
    }

    Ok((
        ConfigOutput {
            command: "config.init".to_string(),
            config: Some(defaults::load_config()),
            path: Some(defaults::config_path()?),
            exists: Some(exists),
            created: Some(create),
            ..ConfigOutput::default()
        },
        0,
    ))
}

fn reset() -> CmdResult<ConfigOutput> {
    let deleted = defaults::reset_config()?;

    Ok((
        ConfigOutput {
            command: "config.reset".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            path: Some(defaults::config_path()?),
            deleted: Some(deleted),
            ..ConfigOutput::default()
        },
        0,
    ))
}

fn path() -> CmdResult<ConfigOutput> {
    let path = defaults::config_path()?;
    let exists = defaults::config_exists();

    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            path: Some(path),
            exists: Some(exists),
            ..ConfigOutput::default()
        },
        0,
    ))
}
