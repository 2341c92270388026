// src/timeline.rs

use crate::error::{Error, Result};
use crate::model::{Commit, Timestamp};
use git2::{ErrorCode, Oid, Repository, Sort};
use std::path::Path;
use tracing::debug;

/// Read-only view of a repository's commit history
pub struct Timeline {
    repo: Repository,
}

impl Timeline {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(Error::vcs(format!("open repository at {}", path.display())))?;
        Ok(Self { repo })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// All commits reachable from `branch`, oldest first.
    ///
    /// The branch HEAD points at before its first commit yields an empty list.
    pub fn list_commits(&self, branch: &str) -> Result<Vec<Commit>> {
        if let Some(unborn) = self.unborn_branch()? {
            let short = unborn.strip_prefix("refs/heads/").unwrap_or(&unborn);
            if branch == "HEAD" || branch == unborn || branch == short {
                return Ok(Vec::new());
            }
        }

        let tip = self.resolve(branch)?;
        let mut revwalk = self.repo.revwalk().map_err(Error::vcs("start revwalk"))?;
        revwalk.set_sorting(Sort::TIME).map_err(Error::vcs("sort revwalk"))?;
        revwalk.push(tip).map_err(Error::vcs(format!("walk {branch}")))?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let id = oid.map_err(Error::vcs(format!("walk {branch}")))?;
            commits.push(Commit { id, timestamp: self.commit_time(id)? });
        }
        commits.reverse(); // Walk from the first commit to the last

        // Skewed committer clocks can defeat the time sort of the walk itself.
        commits.sort_by_key(|commit| commit.timestamp);

        debug!("{} commits reachable from {}", commits.len(), branch);
        Ok(commits)
    }

    pub fn commit_time(&self, id: Oid) -> Result<Timestamp> {
        let commit = self
            .repo
            .find_commit(id)
            .map_err(Error::vcs(format!("find commit {id}")))?;
        Ok(commit.time().seconds())
    }

    /// Full name of the branch HEAD points at, if that branch has no commits yet
    fn unborn_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD").map_err(Error::vcs("read HEAD"))?;
                Ok(head.symbolic_target().map(str::to_string))
            }
            Err(e) => Err(Error::Vcs { action: "read HEAD".to_string(), source: e }),
        }
    }

    fn resolve(&self, branch: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(branch)
            .and_then(|object| object.peel_to_commit())
            .map_err(Error::vcs(format!("resolve branch {branch}")))?;
        Ok(commit.id())
    }
}
