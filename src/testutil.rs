// src/testutil.rs

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

pub const DAY: i64 = 24 * 3600;

/// A fresh repository whose unborn HEAD points at `main`
pub fn init_repo() -> (TempDir, Repository) {
    init_repo_on("main")
}

pub fn init_repo_on(branch: &str) -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(branch);
    let repo = Repository::init_opts(dir.path(), &opts).unwrap();
    (dir, repo)
}

/// Writes `contents` to `path`, commits it on HEAD with the given committer
/// time and returns the new commit id.
pub fn commit_at(repo: &Repository, path: &str, contents: &str, timestamp: i64) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(path), contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature = Signature::new("Test", "test@example.com", &Time::new(timestamp, 0)).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, "commit", &tree, &parents)
        .unwrap()
}

/// Creates `name` at the current HEAD commit without switching to it
pub fn branch_here(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
}

pub fn head_name(repo: &Repository) -> String {
    repo.head().unwrap().shorthand().unwrap().to_string()
}
