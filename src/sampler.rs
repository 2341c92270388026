// src/sampler.rs

use crate::model::{Commit, Timestamp};
use indicatif::ProgressBar;

/// Selects at most `budget` commits, evenly spaced in time, from `commits`.
///
/// `commits` must be ordered by non-decreasing timestamp. Histories no longer
/// than the budget are returned whole.
pub fn sample(commits: &[Commit], budget: usize, progress: &ProgressBar) -> Vec<Commit> {
    debug_assert!(commits.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let budget = budget.max(1);
    let (first, last) = match (commits.first(), commits.last()) {
        (Some(first), Some(last)) if commits.len() > budget => (first.timestamp, last.timestamp),
        _ => {
            progress.finish_and_clear();
            return commits.to_vec();
        }
    };

    progress.set_length(budget as u64);
    let mut selected: Vec<Commit> = Vec::with_capacity(budget);
    for target in targets(first, last, budget) {
        // Timestamps only grow, so no later target can be met either.
        let Some(found) = first_at_or_after(commits, target) else {
            break;
        };
        if selected.last() != Some(found) {
            selected.push(found.clone());
            progress.set_position(selected.len() as u64);
        }
    }
    progress.finish_and_clear();
    selected
}

/// `count` timestamps from `first` to `last`, both ends included.
///
/// Fractional seconds round up, so no target falls before its exact value.
fn targets(first: Timestamp, last: Timestamp, count: usize) -> impl Iterator<Item = Timestamp> {
    let span = i128::from(last) - i128::from(first);
    let steps = count.saturating_sub(1).max(1) as i128;
    (0..count).map(move |n| (i128::from(first) + (span * n as i128 + steps - 1) / steps) as Timestamp)
}

/// Lower bound: the earliest commit whose timestamp is `>= target`
fn first_at_or_after(commits: &[Commit], target: Timestamp) -> Option<&Commit> {
    let idx = commits.partition_point(|commit| commit.timestamp < target);
    commits.get(idx)
}
