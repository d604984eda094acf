//! Visitor dispatch over a list of repositories.

use serde::Serialize;
use std::path::PathBuf;
use std::thread;

use super::{find_repositories, Remote, Repository, VisitOptions};
use crate::error::Result;
use crate::log_status;
use crate::output::ExecutionReport;
use crate::utils::command::CommandOutput;
use crate::vcs::Vcs;

pub const NO_REMOTES: &str = "no remotes detected";
pub const NO_BRANCHES: &str = "no branches detected";
pub const NO_REPOSITORIES: &str = "no repositories detected";

/// Where the repositories to visit come from. There is no implicit default.
#[derive(Debug, Clone)]
pub enum RepoSource {
    List(Vec<Repository>),
    Root { root: PathBuf, marker: String },
}

impl RepoSource {
    pub fn resolve(self) -> Result<Vec<Repository>> {
        match self {
            RepoSource::List(repos) => Ok(repos),
            RepoSource::Root { root, marker } => find_repositories(&root, &marker),
        }
    }
}

/// An operation applied across repositories.
pub trait Visitor: Send + Sync {
    fn name(&self) -> &str;

    /// Entries for one repository. Must not panic or abort on VCS failure.
    fn visit_repository(&self, repo: &Repository, options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport;

    /// Visit the full list. Entries keep repository-list order.
    fn visit(&self, repos: &[Repository], options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport {
        each_repository(repos, options, |repo| {
            log_status!("repo", "{} {}", self.name(), repo.work_tree.display());
            self.visit_repository(repo, options, vcs)
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitReport {
    pub visitor: String,
    pub repositories: Vec<Repository>,
    pub options: VisitOptions,
    pub report: ExecutionReport,
}

impl VisitReport {
    pub fn succeeded(&self) -> bool {
        self.report.succeeded()
    }

    pub fn exit_code(&self) -> i32 {
        self.report.exit_code()
    }
}

/// Resolve the repositories and hand them to `visitor`.
///
/// Only a failure to produce the repository list is an error. An empty list
/// still runs the visitor; per-repository failures live in the report. A root
/// that yields no repositories adds a failed entry for the root.
pub fn do_visit(
    source: RepoSource,
    options: Option<&VisitOptions>,
    vcs: &dyn Vcs,
    visitor: &dyn Visitor,
) -> Result<VisitReport> {
    let searched_root = match &source {
        RepoSource::Root { root, .. } => Some(root.clone()),
        RepoSource::List(_) => None,
    };
    let repositories = source.resolve()?;
    let options = options.cloned().unwrap_or_default();

    log_status!("repo", "{} across {} repositories", visitor.name(), repositories.len());

    let mut report = visitor.visit(&repositories, &options, vcs);
    if let (true, Some(root)) = (repositories.is_empty(), searched_root) {
        report.record_failure(root.display().to_string(), NO_REPOSITORIES);
    }

    Ok(VisitReport {
        visitor: visitor.name().to_string(),
        repositories,
        options,
        report,
    })
}

/// Run `visit` for each repository, sequentially or on scoped worker threads,
/// concatenating the per-repository reports in list order.
pub fn each_repository<F>(repos: &[Repository], options: &VisitOptions, visit: F) -> ExecutionReport
where
    F: Fn(&Repository) -> ExecutionReport + Sync,
{
    let mut report = ExecutionReport::new();

    if !options.parallel || repos.len() <= 1 {
        for repo in repos {
            report.absorb(visit(repo));
        }
        return report;
    }

    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let visit = &visit;

    for chunk in repos.chunks(workers) {
        let results: Vec<ExecutionReport> = thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|repo| scope.spawn(move || visit(repo)))
                .collect();

            handles
                .into_iter()
                .zip(chunk)
                .map(|(handle, repo)| {
                    handle.join().unwrap_or_else(|_| {
                        let mut failed = ExecutionReport::new();
                        failed.record_failure(&repo.id, "worker thread panicked");
                        failed
                    })
                })
                .collect()
        });

        for result in results {
            report.absorb(result);
        }
    }

    report
}

/// Remotes of `repo` that survive the exclusions, or `None` after recording
/// why the repository cannot be visited.
pub(crate) fn selected_remotes(
    repo: &Repository,
    options: &VisitOptions,
    vcs: &dyn Vcs,
    report: &mut ExecutionReport,
) -> Option<Vec<Remote>> {
    let remotes = match vcs.remotes(repo) {
        Ok(remotes) => remotes,
        Err(err) => {
            report.record_failure(&repo.id, err.detail());
            return None;
        }
    };

    if remotes.is_empty() {
        report.record_failure(&repo.id, NO_REMOTES);
        return None;
    }

    Some(
        remotes
            .into_iter()
            .filter(|remote| !options.excludes_remote(&remote.name))
            .collect(),
    )
}

/// Failure detail for a VCS operation; `None` on success.
pub(crate) fn operation_detail(output: &CommandOutput) -> Option<String> {
    if output.success {
        return None;
    }
    let text = output.error_text();
    Some(if text.is_empty() {
        format!("exit code {}", output.exit_code)
    } else {
        format!("exit code {}: {}", output.exit_code, text)
    })
}

// ============================================================================
// Visitors
// ============================================================================

/// One entry per repository; fails when the work tree has uncommitted changes.
pub struct StatusVisitor;

impl Visitor for StatusVisitor {
    fn name(&self) -> &str {
        "status"
    }

    fn visit_repository(&self, repo: &Repository, _options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        match vcs.status(repo) {
            Ok(status) => report.record(&repo.id, status.is_clean(), Some(status.summary())),
            Err(err) => report.record_failure(&repo.id, err.detail()),
        }
        report
    }
}

/// One entry per repository listing its non-excluded remotes.
pub struct RemotesVisitor;

impl Visitor for RemotesVisitor {
    fn name(&self) -> &str {
        "remotes"
    }

    fn visit_repository(&self, repo: &Repository, options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        if let Some(remotes) = selected_remotes(repo, options, vcs, &mut report) {
            let listing = remotes
                .iter()
                .map(|r| format!("{}={}", r.name, r.url))
                .collect::<Vec<_>>()
                .join(", ");
            report.record_success(&repo.id, Some(listing));
        }
        report
    }
}

/// One entry per repository and non-excluded remote.
pub struct FetchVisitor;

impl Visitor for FetchVisitor {
    fn name(&self) -> &str {
        "fetch"
    }

    fn visit_repository(&self, repo: &Repository, options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        let Some(remotes) = selected_remotes(repo, options, vcs, &mut report) else {
            return report;
        };

        for remote in &remotes {
            let output = vcs.fetch(repo, &remote.name);
            report.record(
                format!("{}:{}", repo.id, remote.name),
                output.success,
                operation_detail(&output),
            );
        }
        report
    }
}
