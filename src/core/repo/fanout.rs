//! Push/pull fan-out across remotes and branches.

use serde::Serialize;

use super::visit::{operation_detail, selected_remotes, Visitor, NO_BRANCHES};
use super::{Repository, VisitOptions};
use crate::output::ExecutionReport;
use crate::utils::command::CommandOutput;
use crate::vcs::Vcs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutOp {
    Push,
    Pull,
}

impl FanOutOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanOutOp::Push => "push",
            FanOutOp::Pull => "pull",
        }
    }

    fn run(&self, vcs: &dyn Vcs, repo: &Repository, remote: &str, branch: &str) -> CommandOutput {
        match self {
            FanOutOp::Push => vcs.push(repo, remote, branch),
            FanOutOp::Pull => vcs.pull(repo, remote, branch),
        }
    }
}

/// Apply `op` to every remote × branch pair of one repository.
///
/// Pairs are visited remote-major, each in the order the VCS reports them.
/// Branches filtered out by the options are omitted; a failing pair never
/// stops the remaining pairs.
pub fn fan_out(repo: &Repository, options: &VisitOptions, vcs: &dyn Vcs, op: FanOutOp) -> ExecutionReport {
    let mut report = ExecutionReport::new();

    let Some(remotes) = selected_remotes(repo, options, vcs, &mut report) else {
        return report;
    };

    let branches = match vcs.branches(repo) {
        Ok(branches) if branches.is_empty() => {
            report.record_failure(&repo.id, NO_BRANCHES);
            return report;
        }
        Ok(branches) => branches,
        Err(err) => {
            report.record_failure(&repo.id, err.detail());
            return report;
        }
    };

    let current = if options.current_branch {
        match vcs.current_branch(repo) {
            Ok(current) => current,
            Err(err) => {
                report.record_failure(&repo.id, err.detail());
                return report;
            }
        }
    } else {
        None
    };

    let selected: Vec<&String> = branches
        .iter()
        .filter(|branch| options.selects_branch(branch, current.as_deref()))
        .collect();

    for remote in &remotes {
        for branch in &selected {
            let output = op.run(vcs, repo, &remote.name, branch);
            report.record(
                format!("{}:{}/{}", repo.id, remote.name, branch),
                output.success,
                operation_detail(&output),
            );
        }
    }

    report
}

pub struct FanOutVisitor {
    op: FanOutOp,
}

impl FanOutVisitor {
    pub fn new(op: FanOutOp) -> Self {
        Self { op }
    }

    pub fn push() -> Self {
        Self::new(FanOutOp::Push)
    }

    pub fn pull() -> Self {
        Self::new(FanOutOp::Pull)
    }
}

impl Visitor for FanOutVisitor {
    fn name(&self) -> &str {
        self.op.as_str()
    }

    fn visit_repository(&self, repo: &Repository, options: &VisitOptions, vcs: &dyn Vcs) -> ExecutionReport {
        fan_out(repo, options, vcs, self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{do_visit, RepoSource};
    use crate::vcs::fake::{FakeRepo, FakeVcs};
    use std::path::Path;

    fn repo(name: &str) -> Repository {
        Repository::from_control_dir(format!("/srv/{}/.git", name)).relative_to(Path::new("/srv"))
    }

    fn vcs() -> FakeVcs {
        FakeVcs::default().with_repo("app", FakeRepo::new(&["origin", "upstream"], &["main", "dev"]))
    }

    fn units(report: &ExecutionReport) -> Vec<&str> {
        report.entries().iter().map(|e| e.unit.as_str()).collect()
    }

    #[test]
    fn crosses_remotes_and_branches_in_vcs_order() {
        let report = fan_out(&repo("app"), &VisitOptions::default(), &vcs(), FanOutOp::Push);

        assert_eq!(
            units(&report),
            vec![
                "app:origin/main",
                "app:origin/dev",
                "app:upstream/main",
                "app:upstream/dev"
            ]
        );
        assert!(report.succeeded());
    }

    #[test]
    fn xor_branch_keeps_only_that_branch() {
        let options = VisitOptions::from_pairs([("xor-branch", "main")]);

        let report = fan_out(&repo("app"), &options, &vcs(), FanOutOp::Pull);

        assert_eq!(units(&report), vec!["app:origin/main", "app:upstream/main"]);
        assert!(report.succeeded());
    }

    #[test]
    fn xor_branch_missing_from_repository_yields_no_entries() {
        let options = VisitOptions::from_pairs([("xor-branch", "release")]);

        let report = fan_out(&repo("app"), &options, &vcs(), FanOutOp::Push);

        assert!(report.is_empty());
    }

    #[test]
    fn failing_pair_does_not_stop_the_rest() {
        let vcs = vcs().failing("push origin dev");

        let report = fan_out(&repo("app"), &VisitOptions::default(), &vcs, FanOutOp::Push);

        assert_eq!(report.len(), 4);
        assert!(!report.succeeded());
        let failed: Vec<&str> = report.failures().map(|e| e.unit.as_str()).collect();
        assert_eq!(failed, vec!["app:origin/dev"]);
        assert_eq!(
            report.entries()[1].detail.as_deref(),
            Some("exit code 1: push origin dev rejected")
        );
        assert_eq!(vcs.calls().len(), 4);
    }

    #[test]
    fn current_branch_option_limits_to_checked_out_branch() {
        let mut fake = FakeRepo::new(&["origin"], &["main", "dev"]);
        fake.current = Some("dev".to_string());
        let vcs = FakeVcs::default().with_repo("app", fake);
        let options = VisitOptions::from_pairs([("current-branch", "")]);

        let report = fan_out(&repo("app"), &options, &vcs, FanOutOp::Push);

        assert_eq!(units(&report), vec!["app:origin/dev"]);
    }

    #[test]
    fn excluded_remote_is_skipped() {
        let options = VisitOptions::from_pairs([("exclude-remote", "upstream")]);

        let report = fan_out(&repo("app"), &options, &vcs(), FanOutOp::Push);

        assert_eq!(units(&report), vec!["app:origin/main", "app:origin/dev"]);
    }

    #[test]
    fn repository_without_branches_is_reported() {
        let vcs = FakeVcs::default().with_repo("empty", FakeRepo::new(&["origin"], &[]));

        let report = fan_out(&repo("empty"), &VisitOptions::default(), &vcs, FanOutOp::Push);

        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].detail.as_deref(), Some(NO_BRANCHES));
    }

    #[test]
    fn visitor_aggregates_across_repositories() {
        let vcs = vcs()
            .with_repo("lib", FakeRepo::new(&["origin"], &["main"]))
            .failing("pull origin main");

        let result = do_visit(
            RepoSource::List(vec![repo("app"), repo("lib")]),
            None,
            &vcs,
            &FanOutVisitor::pull(),
        )
        .unwrap();

        assert_eq!(result.visitor, "pull");
        assert_eq!(result.report.len(), 5);
        assert_eq!(result.report.summary().failed, 2);
        assert_eq!(result.exit_code(), 1);
    }
}
