// src/aggregate.rs

use crate::model::{Growth, LanguageSeries, Snapshot, TimeSeries};

/// Number of languages plotted next to the total by default
pub const TOP_LANGUAGES: usize = 10;

/// Builds aligned code-line series for the `top` largest languages of the
/// last snapshot, plus the total series.
pub fn aggregate(snapshots: &[Snapshot], top: usize) -> Growth {
    let Some(last) = snapshots.last() else {
        return Growth::default();
    };

    let mut ranked: Vec<(u64, &str)> = last
        .languages
        .values()
        .map(|metric| (metric.code, metric.language.as_str()))
        .collect();
    ranked.sort_by(|a, b| b.cmp(a));
    ranked.truncate(top);

    let languages = ranked
        .into_iter()
        .map(|(_, language)| LanguageSeries {
            language: language.to_string(),
            points: snapshots
                .iter()
                .map(|snapshot| {
                    // A language missing from a snapshot plots as zero.
                    let code = snapshot.languages.get(language).map_or(0, |m| m.code);
                    (snapshot.timestamp, code)
                })
                .collect(),
        })
        .collect();

    let total: TimeSeries = snapshots
        .iter()
        .map(|snapshot| (snapshot.timestamp, snapshot.total.code))
        .collect();

    Growth { languages, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LanguageMetric;
    use std::collections::BTreeMap;

    fn metric(language: &str, code: u64) -> LanguageMetric {
        LanguageMetric { language: language.into(), files: 1, blank: 0, comment: 0, code }
    }

    fn snapshot(timestamp: i64, total: u64, langs: &[(&str, u64)]) -> Snapshot {
        Snapshot {
            timestamp,
            total: metric("SUM", total),
            languages: langs
                .iter()
                .map(|&(name, code)| (name.to_string(), metric(name, code)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn missing_languages_are_zero_filled() {
        let snapshots = vec![
            snapshot(1, 10, &[("Rust", 10)]),
            snapshot(2, 20, &[("Rust", 20)]),
            snapshot(3, 35, &[("Rust", 30), ("Python", 5)]),
            snapshot(4, 47, &[("Rust", 40), ("Python", 7)]),
        ];
        let growth = aggregate(&snapshots, TOP_LANGUAGES);
        assert_eq!(growth.language("Python").unwrap(), &vec![(1, 0), (2, 0), (3, 5), (4, 7)]);
        assert_eq!(growth.language("Rust").unwrap(), &vec![(1, 10), (2, 20), (3, 30), (4, 40)]);
    }

    #[test]
    fn language_seen_only_in_third_snapshot() {
        let snapshots = vec![
            snapshot(10, 1, &[("Rust", 1)]),
            snapshot(20, 2, &[("Rust", 2)]),
            snapshot(30, 9, &[("Rust", 3), ("Go", 6)]),
            snapshot(40, 4, &[("Rust", 4), ("Go", 0)]),
        ];
        // Go is still present (with zero lines) in the last snapshot, so it is selected.
        let growth = aggregate(&snapshots, TOP_LANGUAGES);
        let go: Vec<u64> = growth.language("Go").unwrap().iter().map(|&(_, v)| v).collect();
        assert_eq!(go, vec![0, 0, 6, 0]);
        let times: Vec<i64> = growth.language("Go").unwrap().iter().map(|&(t, _)| t).collect();
        assert_eq!(times, vec![10, 20, 30, 40]);
    }

    #[test]
    fn selection_uses_only_the_last_snapshot() {
        let snapshots = vec![
            snapshot(1, 1000, &[("Perl", 900), ("Rust", 100)]),
            snapshot(2, 300, &[("Rust", 200), ("Shell", 50), ("Perl", 10)]),
        ];
        let growth = aggregate(&snapshots, 2);
        let names: Vec<&str> = growth.languages.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Shell"]);
        assert!(growth.language("Perl").is_none());
    }

    #[test]
    fn total_is_independent_of_selection() {
        let snapshots = vec![
            snapshot(1, 500, &[("Rust", 100), ("C", 50)]),
            snapshot(2, 800, &[("Rust", 300), ("C", 60)]),
        ];
        let growth = aggregate(&snapshots, 1);
        assert_eq!(growth.total, vec![(1, 500), (2, 800)]);
        assert_eq!(growth.languages.len(), 1);
    }

    #[test]
    fn keeps_at_most_top_languages_largest_first() {
        let langs: Vec<(String, u64)> = (0..15).map(|n| (format!("Lang{n:02}"), n as u64 * 10)).collect();
        let refs: Vec<(&str, u64)> = langs.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let growth = aggregate(&[snapshot(1, 0, &refs)], TOP_LANGUAGES);
        assert_eq!(growth.languages.len(), TOP_LANGUAGES);
        assert_eq!(growth.languages[0].language, "Lang14");
        assert_eq!(growth.languages[9].language, "Lang05");
    }

    #[test]
    fn no_snapshots_no_series() {
        assert_eq!(aggregate(&[], TOP_LANGUAGES), Growth::default());
    }
}
