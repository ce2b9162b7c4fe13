//! Pilotar CLI: run browser scenarios against a configured environment.
//!
//! ## Usage
//!
//! ```bash
//! pilotar                          # Run everything against staging
//! pilotar --env production         # Pick the environment section
//! pilotar --marker smoke           # Only smoke scenarios
//! pilotar --filter login --list    # See what would run
//! ```

mod error;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pilotar::{scenarios, Marker, SessionContext, SuiteResults};

use crate::error::CliResult;

#[derive(Parser, Debug)]
#[command(name = "pilotar")]
#[command(about = "Browser-driven end-to-end scenario runner")]
struct Args {
    /// Directory holding env.yaml, credentials.yaml, tenants.yaml
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Environment to run against
    #[arg(long, default_value = "staging")]
    env: String,

    /// Run only scenarios with this marker (smoke, regression)
    #[arg(long)]
    marker: Option<Marker>,

    /// Run only scenarios whose name contains this substring
    #[arg(long)]
    filter: Option<String>,

    /// Directory for teardown screenshots
    #[arg(long, default_value = pilotar::SCREENSHOTS_DIR)]
    screenshots_dir: PathBuf,

    /// Write suite results as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// List matching scenarios without running them
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> CliResult<bool> {
    let suite = scenarios::all().filtered(args.marker, args.filter.as_deref());

    if args.list {
        for scenario in suite.scenarios() {
            println!("{} [{}]", scenario.name, scenario.marker);
        }
        return Ok(true);
    }

    if suite.is_empty() {
        println!("No scenarios match the given filters.");
        return Ok(true);
    }

    let ctx = SessionContext::load(&args.config_dir, &args.env)?;
    let results = suite.run(&ctx, &args.screenshots_dir).await;

    if let Some(path) = &args.output {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&results)?)?;
    }

    print_summary(&results);
    Ok(results.all_passed())
}

fn print_summary(results: &SuiteResults) {
    println!();
    for result in &results.results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!(
            "{status}  {} [{}] ({} ms)",
            result.name, result.marker, result.duration_ms
        );
        if let Some(error) = &result.error {
            println!("      {error}");
        }
    }
    println!(
        "\n{} suite: {} passed, {} failed, {} total in {} ms",
        results.suite,
        results.passed_count(),
        results.failed_count(),
        results.total(),
        results.duration_ms
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["pilotar"]);
        assert_eq!(args.env, "staging");
        assert_eq!(args.config_dir, PathBuf::from("config"));
        assert_eq!(args.screenshots_dir, PathBuf::from("screenshots"));
        assert!(args.marker.is_none());
        assert!(!args.list);
    }

    #[test]
    fn test_marker_parses() {
        let args = Args::parse_from(["pilotar", "--marker", "smoke"]);
        assert_eq!(args.marker, Some(Marker::Smoke));
    }

    #[test]
    fn test_bad_marker_is_rejected() {
        assert!(Args::try_parse_from(["pilotar", "--marker", "flaky"]).is_err());
    }
}
