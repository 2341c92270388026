// src/cli.rs

use crate::aggregate::TOP_LANGUAGES;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    pub path: PathBuf,

    /// Branch (or any revision) whose history is sampled
    #[arg(short, long, default_value = "HEAD")]
    pub branch: String,

    /// Maximum number of commits to count lines in
    #[arg(
        short = 'n',
        long,
        env = "LOC_HISTORY_MAX_COMMITS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_commits: u64,

    /// Plot the largest languages as well as the total
    #[arg(short, long)]
    pub all: bool,

    /// How many languages to plot with --all, ranked by code lines at the last commit
    #[arg(long, default_value_t = TOP_LANGUAGES)]
    pub top: usize,

    /// File extensions the line counter ignores
    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub exclude_ext: Vec<String>,

    /// Line counting program (must produce cloc's text report)
    #[arg(long, env = "LOC_HISTORY_CLOC", default_value = "cloc")]
    pub cloc: String,

    /// Where to save the PNG chart
    #[arg(short, long, default_value = "loc-history.png")]
    pub output: PathBuf,

    /// Width of the chart in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Height of the chart in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}
