// src/worktree.rs

use crate::error::{Error, Result};
use crate::model::Commit;
use git2::build::CheckoutBuilder;
use git2::{Oid, Repository, StatusOptions};
use tracing::{debug, error, warn};

/// Where HEAD pointed before the first checkout
#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginalHead {
    Branch(String),
    Detached(Oid),
}

/// Exclusive handle on the repository's working directory.
///
/// The reference checked out when the handle is acquired is put back exactly
/// once: by [`Worktree::release`], or on drop if the handle was never released.
pub struct Worktree<'repo> {
    repo: &'repo Repository,
    original: OriginalHead,
    released: bool,
}

impl<'repo> Worktree<'repo> {
    pub fn acquire(repo: &'repo Repository) -> Result<Self> {
        let head = repo.head().map_err(Error::vcs("read HEAD"))?;
        let original = match head.name() {
            Some(name) if head.is_branch() => OriginalHead::Branch(name.to_string()),
            _ => {
                let oid = head
                    .peel_to_commit()
                    .map_err(Error::vcs("resolve detached HEAD"))?
                    .id();
                OriginalHead::Detached(oid)
            }
        };

        let mut status_opts = StatusOptions::new();
        status_opts.include_untracked(false);
        let dirty = repo
            .statuses(Some(&mut status_opts))
            .map_err(Error::vcs("read worktree status"))?
            .len();
        if dirty > 0 {
            warn!("{dirty} modified paths in the working directory will be discarded");
        }

        debug!("worktree acquired at {:?}", original);
        Ok(Self { repo, original, released: false })
    }

    /// Human-readable name of the reference that will be restored
    pub fn original(&self) -> String {
        match &self.original {
            OriginalHead::Branch(name) => name.trim_start_matches("refs/heads/").to_string(),
            OriginalHead::Detached(oid) => oid.to_string(),
        }
    }

    /// Forces the working directory to `commit`'s tree, discarding local changes
    pub fn checkout(&mut self, commit: &Commit) -> Result<()> {
        self.checkout_detached(commit.id)
    }

    /// Restores the original reference and consumes the handle
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.restore()
    }

    fn checkout_detached(&self, id: Oid) -> Result<()> {
        debug!("checking out {id}");
        let commit = self
            .repo
            .find_commit(id)
            .map_err(Error::checkout(id.to_string()))?;
        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .map_err(Error::checkout(id.to_string()))?;
        self.repo
            .set_head_detached(id)
            .map_err(Error::checkout(id.to_string()))
    }

    fn restore(&self) -> Result<()> {
        match &self.original {
            OriginalHead::Branch(name) => {
                debug!("restoring {name}");
                self.repo.set_head(name).map_err(Error::checkout(name.as_str()))?;
                self.repo
                    .checkout_head(Some(CheckoutBuilder::new().force()))
                    .map_err(Error::checkout(name.as_str()))
            }
            OriginalHead::Detached(oid) => self.checkout_detached(*oid),
        }
    }
}

impl Drop for Worktree<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.restore() {
            error!("failed to restore {}: {e}", self.original());
        }
    }
}

/// Runs `f` with exclusive use of the working directory, then restores the
/// original reference whether `f` succeeded or not.
///
/// An error from `f` takes precedence over a restoration error.
pub fn with_worktree<T>(
    repo: &Repository,
    f: impl FnOnce(&mut Worktree<'_>) -> Result<T>,
) -> Result<T> {
    let mut worktree = Worktree::acquire(repo)?;
    let original = worktree.original();
    let outcome = f(&mut worktree);
    let restored = worktree.release();

    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            error!("failed to restore {original}: {restore_err}");
            Err(e)
        }
    }
}
