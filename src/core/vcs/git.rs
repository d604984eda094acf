use crate::error::{Error, Result, VcsCommandFailedDetails};
use crate::repo::{Remote, Repository};
use crate::utils::command::{self, CommandOutput};
use crate::utils::shell;

use super::{Vcs, WorkTreeStatus};

/// Git through its command-line client, run against each repository's work tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn exec(&self, repo: &Repository, args: &[&str]) -> CommandOutput {
        command::run_captured(&self.program, args, Some(&repo.work_tree))
    }

    /// Run a query; a non-zero exit becomes a `vcs.command_failed` error.
    fn query(&self, repo: &Repository, args: &[&str]) -> Result<String> {
        let output = self.exec(repo, args);
        if output.success {
            return Ok(output.stdout);
        }
        Err(self.failure(repo, args, &output))
    }

    fn failure(&self, repo: &Repository, args: &[&str], output: &CommandOutput) -> Error {
        Error::vcs_command_failed(VcsCommandFailedDetails {
            command: shell::command_line(&self.program, args),
            path: Some(repo.work_tree.display().to_string()),
            exit_code: output.exit_code,
            stderr: output.error_text(),
        })
    }
}

impl Vcs for GitCli {
    fn remotes(&self, repo: &Repository) -> Result<Vec<Remote>> {
        let stdout = self.query(repo, &["remote", "-v"])?;
        Ok(parse_remotes(&stdout))
    }

    fn branches(&self, repo: &Repository) -> Result<Vec<String>> {
        let stdout = self.query(
            repo,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
        )?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn current_branch(&self, repo: &Repository) -> Result<Option<String>> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.exec(repo, &args);
        match output.exit_code {
            0 => {
                let name = output.stdout.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            // detached HEAD
            1 => Ok(None),
            _ => Err(self.failure(repo, &args, &output)),
        }
    }

    fn status(&self, repo: &Repository) -> Result<WorkTreeStatus> {
        let stdout = self.query(repo, &["status", "--porcelain"])?;
        Ok(WorkTreeStatus {
            branch: self.current_branch(repo)?,
            changes: stdout
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(String::from)
                .collect(),
        })
    }

    fn fetch(&self, repo: &Repository, remote: &str) -> CommandOutput {
        self.exec(repo, &["fetch", remote])
    }

    fn push(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput {
        self.exec(repo, &["push", remote, branch])
    }

    /// Pulls into the checked-out branch; other branches are fast-forwarded
    /// in place without touching the work tree.
    fn pull(&self, repo: &Repository, remote: &str, branch: &str) -> CommandOutput {
        match self.current_branch(repo) {
            Ok(Some(current)) if current == branch => {
                self.exec(repo, &["pull", "--ff-only", remote, branch])
            }
            _ => {
                let refspec = format!("{}:{}", branch, branch);
                self.exec(repo, &["fetch", remote, &refspec])
            }
        }
    }
}

/// Parse `git remote -v`, keeping the fetch URL and first-seen order.
fn parse_remotes(stdout: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();

    for line in stdout.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
            continue;
        };
        if !remotes.iter().any(|r| r.name == name) {
            remotes.push(Remote::new(name, url));
        }
    }

    remotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let output = command::run_captured("git", args, Some(dir));
        assert!(output.success, "git {:?} failed: {}", args, output.error_text());
    }

    fn commit(dir: &Path) {
        git(
            dir,
            &[
                "-c",
                "user.name=Rigger Test",
                "-c",
                "user.email=rigger@example.test",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--allow-empty",
                "-m",
                "init",
            ],
        );
    }

    fn init_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit(&work);
        let repo = Repository::from_control_dir(work.join(".git"));
        (dir, repo)
    }

    #[test]
    fn parse_remotes_dedupes_fetch_and_push_lines() {
        let stdout = "origin\tgit@example.test:a.git (fetch)\n\
                      origin\tgit@example.test:a.git (push)\n\
                      upstream\thttps://example.test/a.git (fetch)\n\
                      upstream\thttps://example.test/a.git (push)\n";

        let remotes = parse_remotes(stdout);

        assert_eq!(
            remotes,
            vec![
                Remote::new("origin", "git@example.test:a.git"),
                Remote::new("upstream", "https://example.test/a.git"),
            ]
        );
    }

    #[test]
    fn lists_branches_and_current_branch() {
        let (_dir, repo) = init_repo();
        git(&repo.work_tree, &["branch", "dev"]);

        let git = GitCli::default();

        assert_eq!(git.branches(&repo).unwrap(), vec!["dev", "main"]);
        assert_eq!(git.current_branch(&repo).unwrap().as_deref(), Some("main"));
    }

    #[test]
    fn lists_remotes() {
        let (_dir, repo) = init_repo();
        git(&repo.work_tree, &["remote", "add", "origin", "https://example.test/o.git"]);
        git(&repo.work_tree, &["remote", "add", "upstream", "https://example.test/u.git"]);

        let names: Vec<String> = GitCli::default()
            .remotes(&repo)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(names, vec!["origin", "upstream"]);
    }

    #[test]
    fn status_reports_untracked_files() {
        let (_dir, repo) = init_repo();
        let git = GitCli::default();
        assert!(git.status(&repo).unwrap().is_clean());

        std::fs::write(repo.work_tree.join("new.txt"), "x").unwrap();

        let status = git.status(&repo).unwrap();
        assert!(!status.is_clean());
        assert_eq!(status.summary(), "main: 1 uncommitted change(s)");
    }

    #[test]
    fn push_to_bare_remote() {
        let (dir, repo) = init_repo();
        let bare = dir.path().join("remote.git");
        std::fs::create_dir(&bare).unwrap();
        git(&bare, &["init", "--bare", "--quiet"]);
        git(&repo.work_tree, &["remote", "add", "origin", bare.to_str().unwrap()]);

        let git = GitCli::default();

        assert!(git.push(&repo, "origin", "main").success);
        assert!(git.fetch(&repo, "origin").success);
        assert!(git.pull(&repo, "origin", "main").success);
        assert!(!git.push(&repo, "origin", "missing-branch").success);
    }

    #[test]
    fn query_outside_repository_fails_with_vcs_error() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::from_control_dir(dir.path().join(".git"));

        let err = GitCli::default().remotes(&repo).unwrap_err();

        assert_eq!(err.code, crate::ErrorCode::VcsCommandFailed);
        assert_eq!(err.details["command"], "git remote -v");
    }
}
