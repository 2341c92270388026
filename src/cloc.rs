// src/cloc.rs

use crate::error::{Error, Result};
use crate::model::LanguageMetric;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// cloc release whose text report layout the parser below targets
pub const CLOC_FORMAT_VERSION: &str = "2.02";

/// Rule, column header, rule
const HEADER_ROWS: usize = 3;
/// Rule, `SUM:` row (a closing rule follows)
const FOOTER_ROWS: usize = 2;
const COLUMNS: [&str; 5] = ["Language", "files", "blank", "comment", "code"];

static FIELD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static BANNER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cloc v\s*(\d+\.\d+)").unwrap());

/// Per-language counts for one working-directory state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClocReport {
    /// Version from the report banner, when present
    pub version: Option<String>,
    pub total: LanguageMetric,
    pub languages: BTreeMap<String, LanguageMetric>,
}

/// Something that can count lines in a checked-out directory
pub trait LineCounter {
    fn count(&self, dir: &Path) -> Result<ClocReport>;
}

/// The `cloc` command-line tool
#[derive(Debug, Clone)]
pub struct Cloc {
    pub program: String,
    pub exclude_ext: Vec<String>,
}

impl Cloc {
    pub fn new(program: impl Into<String>, exclude_ext: Vec<String>) -> Self {
        Self { program: program.into(), exclude_ext }
    }

    fn args(&self) -> Vec<String> {
        // --sum-one keeps the SUM: row when only one file is counted
        let mut args = vec![".".to_string(), "--vcs=git".to_string(), "--sum-one".to_string()];
        if !self.exclude_ext.is_empty() {
            args.push(format!("--exclude-ext={}", self.exclude_ext.join(",")));
        }
        args
    }
}

impl LineCounter for Cloc {
    fn count(&self, dir: &Path) -> Result<ClocReport> {
        let args = self.args();
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("running {command} in {}", dir.display());

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(dir)
            .output()
            .map_err(|source| Error::Io { command: command.clone(), source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool {
                command,
                status: output.status,
                output: format!("{stdout}{stderr}"),
            });
        }

        let report = parse_report(&stdout)?;
        if let Some(version) = report.version.as_deref() {
            if version != CLOC_FORMAT_VERSION {
                warn!("cloc {version} report parsed with the {CLOC_FORMAT_VERSION} layout");
            }
        }
        Ok(report)
    }
}

/// Checks that `git` (used by `cloc --vcs=git`) and the line counter can be
/// run, returning the counter's version string.
pub fn check_dependencies(cloc: &str) -> Result<String> {
    probe("git", "https://git-scm.com/downloads")?;
    let version = probe(cloc, "https://github.com/AlDanial/cloc")?;
    if version != CLOC_FORMAT_VERSION {
        warn!("found cloc {version}; report parsing targets cloc {CLOC_FORMAT_VERSION}");
    }
    Ok(version)
}

fn probe(program: &str, hint: &str) -> Result<String> {
    let missing = || Error::MissingDependency { program: program.to_string(), hint: hint.to_string() };
    let output = Command::new(program).arg("--version").output().map_err(|_| missing())?;
    if !output.status.success() {
        return Err(missing());
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("{program} --version: {version}");
    Ok(version)
}

/// Parses cloc's default text report.
///
/// The table is located at its first rule line and read by position: three
/// header rows, one row per language, a rule and the `SUM:` row, then a
/// closing rule. Output without any table means nothing was countable.
pub fn parse_report(text: &str) -> Result<ClocReport> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let version = lines
        .iter()
        .find_map(|line| BANNER_VERSION.captures(line))
        .map(|caps| caps[1].to_string());

    let Some(start) = lines.iter().position(|line| is_rule(line)) else {
        return Ok(ClocReport { version, ..ClocReport::default() });
    };
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(start, |idx| idx + 1);
    let table = &lines[start..end];

    let malformed = |reason: String| Error::MalformedReport { reason, report: text.to_string() };

    if table.len() < HEADER_ROWS + FOOTER_ROWS + 1 {
        return Err(malformed(format!("table has only {} rows", table.len())));
    }
    let closing = table.len() - 1;
    let footer = closing - FOOTER_ROWS;

    for idx in [0, HEADER_ROWS - 1, footer, closing] {
        if !is_rule(table[idx]) {
            return Err(malformed(format!("expected a rule line, found `{}`", table[idx])));
        }
    }
    let columns = split_fields(table[1]);
    if columns != COLUMNS {
        return Err(malformed(format!("unexpected column header `{}`", table[1])));
    }

    let mut languages = BTreeMap::new();
    for row in &table[HEADER_ROWS..footer] {
        let metric = parse_row(row).map_err(malformed)?;
        languages.insert(metric.language.clone(), metric);
    }

    let mut total = parse_row(table[footer + 1]).map_err(malformed)?;
    if total.language != "SUM:" {
        return Err(malformed(format!("expected the SUM: row, found `{}`", table[footer + 1])));
    }
    total.language = "SUM".to_string();

    Ok(ClocReport { version, total, languages })
}

fn is_rule(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '-')
}

fn split_fields(row: &str) -> Vec<&str> {
    FIELD_SEPARATOR.split(row.trim()).collect()
}

fn parse_row(row: &str) -> std::result::Result<LanguageMetric, String> {
    let fields = split_fields(row);
    let [language, files, blank, comment, code] = fields[..] else {
        return Err(format!("expected {} columns in `{row}`", COLUMNS.len()));
    };
    let number = |field: &str| {
        field
            .parse::<u64>()
            .map_err(|_| format!("`{field}` is not a count in `{row}`"))
    };
    Ok(LanguageMetric {
        language: language.to_string(),
        files: number(files)?,
        blank: number(blank)?,
        comment: number(comment)?,
        code: number(code)?,
    })
}
