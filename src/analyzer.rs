// src/analyzer.rs

use crate::cloc::LineCounter;
use crate::error::{Error, Result};
use crate::model::{Commit, Snapshot};
use crate::sampler;
use crate::timeline::Timeline;
use crate::worktree::with_worktree;
use indicatif::ProgressBar;
use tracing::info;

/// Outcome of sampling one branch
#[derive(Debug)]
pub struct Analysis {
    /// Number of commits on the branch before sampling
    pub history_len: usize,
    pub sampled: Vec<Commit>,
    pub snapshots: Vec<Snapshot>,
}

/// Samples up to `budget` commits of `branch` and counts lines at each one.
///
/// The working directory is restored to its original reference before this
/// returns, whether counting succeeded or not. An empty history touches
/// nothing.
pub fn analyze(
    timeline: &Timeline,
    branch: &str,
    budget: usize,
    counter: &dyn LineCounter,
) -> Result<Analysis> {
    let commits = timeline.list_commits(branch)?;

    let search_bar = ProgressBar::new(budget as u64);
    search_bar.set_message("Finding commits");
    let sampled = sampler::sample(&commits, budget, &search_bar);
    info!("sampled {} of {} commits in {}", sampled.len(), commits.len(), branch);

    if sampled.is_empty() {
        return Ok(Analysis { history_len: commits.len(), sampled, snapshots: Vec::new() });
    }

    let repo = timeline.repo();
    let workdir = repo.workdir().ok_or_else(|| Error::Vcs {
        action: "find the working directory".to_string(),
        source: git2::Error::from_str("bare repositories cannot be checked out"),
    })?;

    let snapshots = with_worktree(repo, |worktree| {
        info!("counting lines in {} commits, then restoring {}", sampled.len(), worktree.original());
        let bar = ProgressBar::new(sampled.len() as u64);
        let mut snapshots = Vec::with_capacity(sampled.len());
        for commit in &sampled {
            bar.set_message(format!("Counting lines in commit {}", commit.id));
            worktree.checkout(commit)?;
            let report = counter.count(workdir)?;
            snapshots.push(Snapshot {
                timestamp: commit.timestamp,
                total: report.total,
                languages: report.languages,
            });
            bar.inc(1);
        }
        bar.finish_with_message("Counting complete");
        Ok(snapshots)
    })?;

    Ok(Analysis { history_len: commits.len(), sampled, snapshots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloc::{parse_report, tests::report, ClocReport};
    use crate::testutil::{commit_at, head_name, init_repo, init_repo_on, DAY};
    use std::cell::{Cell, RefCell};
    use std::path::Path;

    /// Counts `src.rs` lines as Rust code; fails on the given call number
    #[derive(Default)]
    struct FileCounter {
        calls: Cell<usize>,
        fail_on: Option<usize>,
        seen: RefCell<Vec<String>>,
    }

    impl LineCounter for FileCounter {
        fn count(&self, dir: &Path) -> Result<ClocReport> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            let contents = std::fs::read_to_string(dir.join("src.rs")).unwrap();
            self.seen.borrow_mut().push(contents.clone());
            if self.fail_on == Some(call) {
                return Err(Error::MalformedReport { reason: "injected".into(), report: String::new() });
            }
            let code = contents.lines().count() as u64;
            parse_report(&report(&[("Rust", 1, 0, 0, code)], (1, 0, 0, code)))
        }
    }

    fn source(lines: usize) -> String {
        (0..lines).map(|n| format!("fn f{n}() {{}}\n")).collect()
    }

    #[test]
    fn samples_endpoints_and_midpoint_over_ten_days() {
        let (dir, repo) = init_repo();
        for (lines, day) in [(1, 0), (2, 2), (3, 4), (4, 7), (5, 10)] {
            commit_at(&repo, "src.rs", &source(lines), day * DAY);
        }

        let timeline = Timeline::open(dir.path()).unwrap();
        let counter = FileCounter::default();
        let analysis = analyze(&timeline, "main", 3, &counter).unwrap();

        let times: Vec<i64> = analysis.snapshots.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![0, 7 * DAY, 10 * DAY]);
        let code: Vec<u64> = analysis.snapshots.iter().map(|s| s.total.code).collect();
        assert_eq!(code, vec![1, 4, 5]);
        assert_eq!(analysis.history_len, 5);
        assert_eq!(counter.seen.borrow()[1], source(4));

        assert_eq!(head_name(&repo), "main");
        assert_eq!(std::fs::read_to_string(dir.path().join("src.rs")).unwrap(), source(5));
    }

    #[test]
    fn short_history_counts_every_commit() {
        let (dir, repo) = init_repo();
        commit_at(&repo, "src.rs", &source(1), 0);
        commit_at(&repo, "src.rs", &source(3), DAY);

        let timeline = Timeline::open(dir.path()).unwrap();
        let analysis = analyze(&timeline, "main", 30, &FileCounter::default()).unwrap();
        assert_eq!(analysis.snapshots.len(), 2);
        assert_eq!(analysis.snapshots[1].languages["Rust"].code, 3);
    }

    #[test]
    fn failure_mid_extraction_restores_original_branch() {
        let (dir, repo) = init_repo();
        for (lines, day) in [(1, 0), (2, 1), (3, 2)] {
            commit_at(&repo, "src.rs", &source(lines), day * DAY);
        }

        let timeline = Timeline::open(dir.path()).unwrap();
        let counter = FileCounter { fail_on: Some(2), ..FileCounter::default() };
        let result = analyze(&timeline, "main", 30, &counter);

        assert!(matches!(result, Err(Error::MalformedReport { .. })));
        assert_eq!(counter.calls.get(), 2);
        assert_eq!(head_name(&repo), "main");
        assert_eq!(std::fs::read_to_string(dir.path().join("src.rs")).unwrap(), source(3));
    }

    #[test]
    fn empty_history_touches_nothing() {
        let (dir, repo) = init_repo();
        let timeline = Timeline::open(dir.path()).unwrap();
        let counter = FileCounter::default();

        let analysis = analyze(&timeline, "main", 3, &counter).unwrap();

        assert!(analysis.sampled.is_empty());
        assert!(analysis.snapshots.is_empty());
        assert_eq!(counter.calls.get(), 0);
        assert!(repo.head().is_err());
    }

    #[test]
    fn empty_history_on_non_default_branch_name() {
        let (dir, _repo) = init_repo_on("trunk");
        let timeline = Timeline::open(dir.path()).unwrap();
        let counter = FileCounter::default();

        let analysis = analyze(&timeline, "trunk", 3, &counter).unwrap();

        assert!(analysis.sampled.is_empty());
        assert_eq!(counter.calls.get(), 0);
    }

    #[test]
    fn unknown_branch_is_a_vcs_error() {
        let (dir, repo) = init_repo();
        commit_at(&repo, "src.rs", &source(1), 0);
        let timeline = Timeline::open(dir.path()).unwrap();
        let counter = FileCounter::default();

        let result = analyze(&timeline, "no-such-branch", 3, &counter);

        assert!(matches!(result, Err(Error::Vcs { .. })));
        assert_eq!(counter.calls.get(), 0);
        assert_eq!(head_name(&repo), "main");
    }
}
