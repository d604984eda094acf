//! Version-control query and operation layer.
//!
//! Queries (`remotes`, `branches`, `status`) return `Err` when the VCS cannot
//! answer; visitors turn that into a failed entry for the one repository.
//! Operations (`fetch`, `push`, `pull`) return the captured process output and
//! never fail outright.

mod git;

pub use git::GitCli;

use serde::Serialize;

use crate::error::Result;
use crate::repo::{Remote, Repository};
use crate::utils::command::CommandOutput;

/// Working-tree cleanliness for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTreeStatus {
    pub branch: Option<String>,
    /// One line per changed or untracked path.
    pub changes: Vec<String>,
}

impl WorkTreeStatus {
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn summary(&self) -> String {
        let branch = self.branch.as_deref().unwrap_or("(detached)");
        if self.is_clean() {
            format!("{}: clean", branch)
        } else {
            format!("{}: {} uncommitted change(s)", branch, self.changes.len())
        }
    }
}

pub trait Vcs: Send + Sync {
    /// Remotes in the order the VCS reports them.
    fn remotes(&self, repo: &Repository) -> Result<Vec<Remote>>;

    /// Local branch names in the order the VCS reports them.
    fn branches(&self, repo: &Repository) -> Result<Vec<String>>;

    /// Checked-out branch, `None` when detached.
    fn current_branch(&self, repo: &Repository) -> Result<Option<String>>;

    fn status(&self, repo: &Repository) -> Result<WorkTreeStatus>;

    fn fetch(&self, repo: &Repository, remote: &str) -> CommandOutput;

    fn push(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput;

    fn pull(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory VCS for visitor tests.

    use super::*;
    use crate::error::{Error, ErrorCode};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default)]
    pub struct FakeRepo {
        pub remotes: Vec<Remote>,
        pub branches: Vec<String>,
        pub current: Option<String>,
        pub changes: Vec<String>,
    }

    impl FakeRepo {
        pub fn new(remotes: &[&str], branches: &[&str]) -> Self {
            Self {
                remotes: remotes
                    .iter()
                    .map(|name| Remote::new(*name, format!("https://example.test/{}.git", name)))
                    .collect(),
                branches: branches.iter().map(|b| b.to_string()).collect(),
                current: branches.first().map(|b| b.to_string()),
                changes: Vec::new(),
            }
        }
    }

    /// Repos keyed by id; operations listed in `failing` (e.g. "push upstream dev") fail.
    #[derive(Default)]
    pub struct FakeVcs {
        pub repos: HashMap<String, FakeRepo>,
        pub failing: Vec<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeVcs {
        pub fn with_repo(mut self, name: &str, repo: FakeRepo) -> Self {
            self.repos.insert(name.to_string(), repo);
            self
        }

        pub fn failing(mut self, call: &str) -> Self {
            self.failing.push(call.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn repo(&self, repo: &Repository) -> Result<&FakeRepo> {
            self.repos.get(&repo.id).ok_or_else(|| {
                Error::new(
                    ErrorCode::VcsCommandFailed,
                    format!("not a repository: {}", repo.id),
                    serde_json::Value::Null,
                )
            })
        }

        fn operation(&self, repo: &Repository, call: String) -> CommandOutput {
            let failed = self.failing.contains(&call);
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(format!("{} {}", repo.id, call));
            }
            CommandOutput {
                success: !failed,
                exit_code: if failed { 1 } else { 0 },
                stdout: String::new(),
                stderr: if failed {
                    format!("{} rejected", call)
                } else {
                    String::new()
                },
            }
        }
    }

    impl Vcs for FakeVcs {
        fn remotes(&self, repo: &Repository) -> Result<Vec<Remote>> {
            Ok(self.repo(repo)?.remotes.clone())
        }

        fn branches(&self, repo: &Repository) -> Result<Vec<String>> {
            Ok(self.repo(repo)?.branches.clone())
        }

        fn current_branch(&self, repo: &Repository) -> Result<Option<String>> {
            Ok(self.repo(repo)?.current.clone())
        }

        fn status(&self, repo: &Repository) -> Result<WorkTreeStatus> {
            let fake = self.repo(repo)?;
            Ok(WorkTreeStatus {
                branch: fake.current.clone(),
                changes: fake.changes.clone(),
            })
        }

        fn fetch(&self, repo: &Repository, remote: &str) -> CommandOutput {
            self.operation(repo, format!("fetch {}", remote))
        }

        fn push(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput {
            self.operation(repo, format!("push {} {}", remote, branch))
        }

        fn pull(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput {
            self.operation(repo, format!("pull {} {}", remote, branch))
        }
    }
}
