use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use rigger::defaults::{self, Defaults};
use rigger::repo::{
    self, do_visit, FanOutVisitor, FetchVisitor, RemotesVisitor, RepoSource, Repository,
    StatusVisitor, VisitOptions, VisitReport, Visitor,
};
use rigger::utils::validation;
use rigger::vcs::GitCli;

use super::CmdResult;

#[derive(Args)]
pub struct RepoArgs {
    #[command(subcommand)]
    command: RepoCommand,
}

#[derive(Subcommand)]
enum RepoCommand {
    /// List repositories found under the root
    List(TargetArgs),
    /// Report work-tree cleanliness per repository
    Status(TargetArgs),
    /// List each repository's remotes
    Remotes(TargetArgs),
    /// Fetch every remote of every repository
    Fetch(TargetArgs),
    /// Push every branch to every remote
    Push(TargetArgs),
    /// Pull every branch from every remote
    Pull(TargetArgs),
}

#[derive(Args, Debug, Default)]
struct TargetArgs {
    /// Directory to search for repositories (defaults to repos.root from config)
    #[arg(long)]
    root: Option<String>,

    /// Explicit repository (work tree or control directory); repeatable
    #[arg(long = "repo", value_name = "PATH")]
    repos: Vec<String>,

    /// Control-directory name that marks a repository
    #[arg(long)]
    marker: Option<String>,

    /// Only operate on this branch
    #[arg(long, value_name = "BRANCH")]
    xor_branch: Option<String>,

    /// Skip this remote (name or glob); repeatable
    #[arg(long = "exclude-remote", value_name = "REMOTE")]
    exclude_remotes: Vec<String>,

    /// Only operate on each repository's checked-out branch
    #[arg(long)]
    current_branch: bool,

    /// Raw visitor option; unrecognized keys are ignored
    #[arg(long = "option", short = 'o', value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Process repositories concurrently
    #[arg(long)]
    parallel: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RepoOutput {
    List {
        command: String,
        repositories: Vec<Repository>,
    },
    Visit {
        command: String,
        #[serde(flatten)]
        result: VisitReport,
    },
}

pub fn run(args: RepoArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RepoOutput> {
    let defaults = defaults::load_defaults();

    match args.command {
        RepoCommand::List(target) => list(&target, &defaults),
        RepoCommand::Status(target) => visit(&target, &defaults, &StatusVisitor),
        RepoCommand::Remotes(target) => visit(&target, &defaults, &RemotesVisitor),
        RepoCommand::Fetch(target) => visit(&target, &defaults, &FetchVisitor),
        RepoCommand::Push(target) => visit(&target, &defaults, &FanOutVisitor::push()),
        RepoCommand::Pull(target) => visit(&target, &defaults, &FanOutVisitor::pull()),
    }
}

fn list(target: &TargetArgs, defaults: &Defaults) -> CmdResult<RepoOutput> {
    let repositories = source(target, defaults)?.resolve()?;
    let exit_code = if repositories.is_empty() { 1 } else { 0 };

    Ok((
        RepoOutput::List {
            command: "repo.list".to_string(),
            repositories,
        },
        exit_code,
    ))
}

fn visit(target: &TargetArgs, defaults: &Defaults, visitor: &dyn Visitor) -> CmdResult<RepoOutput> {
    let source = source(target, defaults)?;
    let options = options(target, defaults);
    let vcs = GitCli::new(defaults.vcs.program.clone());

    let result = do_visit(source, Some(&options), &vcs, visitor)?;
    let exit_code = result.exit_code();

    Ok((
        RepoOutput::Visit {
            command: format!("repo.{}", visitor.name()),
            result,
        },
        exit_code,
    ))
}

/// Explicit `--repo` paths win; otherwise enumerate from `--root` or the configured root.
fn source(target: &TargetArgs, defaults: &Defaults) -> rigger::Result<RepoSource> {
    let marker = target
        .marker
        .clone()
        .unwrap_or_else(|| defaults.repos.marker.clone());

    if !target.repos.is_empty() {
        let repos = target
            .repos
            .iter()
            .map(|raw| Repository::from_path(&expand(raw), &marker))
            .collect();
        return Ok(RepoSource::List(repos));
    }

    let root = target
        .root
        .as_deref()
        .map(expand)
        .or_else(|| defaults.repos.expanded_root());
    let root = validation::require(
        root,
        "root",
        "No repository root: pass --root or --repo, or set defaults.repos.root",
    )?;

    Ok(RepoSource::Root { root, marker })
}

fn options(target: &TargetArgs, defaults: &Defaults) -> VisitOptions {
    let mut pairs: Vec<(String, String)> = target
        .options
        .iter()
        .map(|raw| VisitOptions::parse_pair(raw))
        .collect();

    if let Some(branch) = &target.xor_branch {
        pairs.push((repo::XOR_BRANCH.to_string(), branch.clone()));
    }
    for remote in &target.exclude_remotes {
        pairs.push((repo::EXCLUDE_REMOTE.to_string(), remote.clone()));
    }
    if target.current_branch {
        pairs.push((repo::CURRENT_BRANCH.to_string(), String::new()));
    }

    let mut options = VisitOptions::from_pairs(pairs).with_config(&defaults.repos);
    options.parallel |= target.parallel;
    options
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_raw_options_merge() {
        let target = TargetArgs {
            xor_branch: Some("main".to_string()),
            exclude_remotes: vec!["backup".to_string()],
            options: vec!["exclude-remote=mirror-*".to_string(), "unknown=1".to_string()],
            ..TargetArgs::default()
        };

        let options = options(&target, &Defaults::default());

        assert_eq!(options.xor_branch.as_deref(), Some("main"));
        assert_eq!(options.exclude_remotes, vec!["mirror-*", "backup"]);
        assert!(!options.current_branch);
        assert!(!options.parallel);
    }

    #[test]
    fn explicit_repos_take_precedence_over_root() {
        let target = TargetArgs {
            root: Some("/srv".to_string()),
            repos: vec!["/srv/app".to_string()],
            ..TargetArgs::default()
        };

        match source(&target, &Defaults::default()).unwrap() {
            RepoSource::List(repos) => {
                assert_eq!(repos.len(), 1);
                assert_eq!(repos[0].control_dir, PathBuf::from("/srv/app/.git"));
            }
            other => panic!("expected explicit list, got {:?}", other),
        }
    }

    #[test]
    fn listing_an_empty_root_exits_one() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = TargetArgs {
            root: Some(dir.path().to_string_lossy().to_string()),
            ..TargetArgs::default()
        };

        let (output, exit_code) = list(&target, &Defaults::default()).unwrap();

        assert_eq!(exit_code, 1);
        match output {
            RepoOutput::List { repositories, .. } => assert!(repositories.is_empty()),
            other => panic!("expected list output, got {:?}", other),
        }
    }

    #[test]
    fn missing_root_is_a_validation_error() {
        let err = source(&TargetArgs::default(), &Defaults::default()).unwrap_err();
        assert_eq!(err.code, rigger::ErrorCode::ValidationInvalidArgument);
    }
}
