//! WeSign report aggregator - CLI entry point.
//!
//! Exit code 0 when the overall score meets the pass threshold (or no
//! artifacts were found), 1 otherwise or on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wesign_reports_lib::config::{AggregatorConfig, RunContext};
use wesign_reports_lib::error::AppError;
use wesign_reports_lib::models::{MISSING_COMPONENT_PENALTY, ReportSummary};
use wesign_reports_lib::services::ReportAggregator;

/// Aggregate test reports from a workspace into a scored run summary.
#[derive(Debug, Parser)]
#[command(name = "wesign-reports", version, about)]
struct Cli {
    /// Workspace directory to scan for artifacts
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Write the JSON summary to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run identifier (default: timestamp based)
    #[arg(long)]
    run_id: Option<String>,

    /// JSON config file merged over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Artifact glob patterns, replacing the defaults
    #[arg(long, num_args = 1..)]
    patterns: Option<Vec<String>>,

    /// Write a ZIP archive of the summary and artifacts
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Post the summary to QA Intelligence
    #[arg(long)]
    qa_intelligence: bool,

    /// Environment name recorded in the summary
    #[arg(long)]
    environment: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Report aggregation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let config = AggregatorConfig::load(cli.config.as_deref())?;
    let pass_threshold = config.pass_threshold;

    let mut context = RunContext::from_env();
    if let Some(environment) = cli.environment {
        context = context.with_environment(environment);
    }

    if !cli.workspace.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "workspace {} is not a directory",
            cli.workspace.display()
        ))
        .into());
    }

    let mut aggregator = ReportAggregator::new(&cli.workspace, context, config);

    if aggregator.collect_artifacts(cli.patterns.as_deref()).is_empty() {
        warn!("No artifacts found in {}", cli.workspace.display());
        return Ok(ExitCode::SUCCESS);
    }

    aggregator.parse_reports();
    let mut summary = aggregator.generate_summary(cli.run_id.as_deref());

    if cli.qa_intelligence && !aggregator.report_to_qa_intelligence(&mut summary) {
        warn!("Continuing without QA Intelligence report");
    }

    let mut side_effects_ok = true;
    if let Some(output) = &cli.output {
        side_effects_ok &= aggregator.export_summary(&summary, output);
    }
    if let Some(archive) = &cli.archive {
        side_effects_ok &= aggregator.archive_artifacts(&summary, archive);
    }

    print_summary(&summary, pass_threshold);

    let passed = summary.overall_score() >= pass_threshold;
    info!(
        "Overall score {:.1} ({} threshold {:.1})",
        summary.overall_score(),
        if passed { "meets" } else { "below" },
        pass_threshold
    );

    if !side_effects_ok {
        error!("One or more requested outputs could not be written");
        return Ok(ExitCode::FAILURE);
    }

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(summary: &ReportSummary, pass_threshold: f64) {
    let scores = &summary.scores;
    let verdict = if summary.overall_score() >= pass_threshold {
        "PASS"
    } else {
        "FAIL"
    };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  Test Run Summary: {}", summary.run_id);
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  Environment: {}", summary.environment);
    if let Some(build) = &summary.jenkins_build_number {
        println!("  Build:       #{}", build);
    }
    if let Some(commit) = &summary.git_commit_hash {
        println!("  Commit:      {}", commit);
    }
    println!("  Artifacts:   {}", summary.artifacts.len());
    println!("  Reports:     {}", summary.metrics.len());
    println!();
    println!("  Build:       {:>6.1}", scores.build());
    println!("  Smoke:       {:>6.1}", scores.smoke());
    println!("  API:         {:>6.1}", scores.api());
    println!("  E2E:         {:>6.1}", scores.e2e());
    println!("  ──────────────────");
    println!("  Overall:     {:>6.1}  {}", scores.overall(), verdict);
    let missing = scores.missing_components();
    if missing > 0 {
        println!(
            "  Missing:     {} of 4 categories (-{:.0} points)",
            missing,
            missing as f64 * MISSING_COMPONENT_PENALTY
        );
    }
    println!();

    for (name, metrics) in &summary.metrics {
        println!(
            "  {:<40} {:>4}/{:<4} passed  {:>5.1}%",
            name, metrics.passed_tests, metrics.total_tests, metrics.success_rate
        );
    }
    if !summary.metrics.is_empty() {
        println!();
    }
    println!("════════════════════════════════════════════════════════════════");
    println!();
}
