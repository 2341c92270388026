// src/main.rs

mod aggregate;
mod analyzer;
mod cli;
mod cloc;
mod error;
mod model;
mod renderer;
mod sampler;
#[cfg(test)]
mod testutil;
mod timeline;
mod worktree;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use cloc::Cloc;
use std::time::Instant;
use timeline::Timeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    // Nothing is checked out before every external tool is known to run.
    let version = cloc::check_dependencies(&args.cloc)?;
    tracing::info!("using cloc {version}");

    let timeline = Timeline::open(&args.path)?;
    let counter = Cloc::new(args.cloc.as_str(), args.exclude_ext.clone());
    let budget = usize::try_from(args.max_commits).unwrap_or(usize::MAX);

    let analysis = analyzer::analyze(&timeline, &args.branch, budget, &counter)
        .with_context(|| format!("counting lines of code in {}", args.branch))?;

    let (Some(first), Some(last)) = (analysis.sampled.first(), analysis.sampled.last()) else {
        println!("No commits found in branch {}", args.branch);
        return Ok(());
    };

    println!(
        "Analysis finished in {:.2?}. Counted lines in {} of {} commits.",
        start_time.elapsed(),
        analysis.sampled.len(),
        analysis.history_len
    );
    println!(
        "Sampled history spans from {} to {}.",
        first.datetime().to_rfc2822(),
        last.datetime().to_rfc2822()
    );

    let growth = aggregate::aggregate(&analysis.snapshots, args.top);
    let plotted = renderer::render_chart(&growth, &args)?;

    println!("Lines of code in {} ({}):", args.branch, args.output.display());
    for series in &plotted {
        let latest = series.points.last().map_or(0, |&(_, code)| code);
        println!("  {}  {:<24} {:>10}", renderer::hex(series.color), series.label, latest);
    }

    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}
