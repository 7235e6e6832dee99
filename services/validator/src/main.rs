mod cli;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dataset::{
    CostEstimate, DatasetSummary, FileReport, NamedValidation, ReportOptions, SummaryReport,
};
use serde::Serialize;
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::AppConfig;

const BANNER: &str = "FINE-TUNING DATASET VALIDATOR";

const EXIT_VALID: u8 = 0;
const EXIT_INVALID: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = AppConfig::from_env()
        .context("Failed to load configuration")
        .and_then(|cfg| run(cfg, &cli))
        .and_then(|outcome| {
            render(&outcome, cli.json)?;
            Ok(outcome)
        });

    if let Err(e) = &outcome {
        error!("{e:#}");
        eprintln!("\n❌ {e:#}\n");
    }
    ExitCode::from(exit_status(&outcome))
}

/// Everything one invocation found, ready to print either way.
struct Outcome {
    files: Vec<NamedValidation>,
    summary: DatasetSummary,
    cost: CostEstimate,
    report: ReportOptions,
    min_recommended_examples: u64,
}

/// `--json` document.
#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [NamedValidation],
    summary: &'a DatasetSummary,
    cost: CostEstimate,
}

impl Outcome {
    fn json_report(&self) -> JsonReport<'_> {
        JsonReport { files: &self.files, summary: &self.summary, cost: self.cost }
    }
}

fn run(mut cfg: AppConfig, cli: &Cli) -> Result<Outcome> {
    cfg.apply_cli(cli)?;

    let paths = if cli.files.is_empty() { cfg.default_files() } else { cli.files.clone() };
    info!(files = paths.len(), "validating datasets");

    let files: Vec<NamedValidation> = paths
        .iter()
        .map(|path| NamedValidation::validate(path, &cfg.validator))
        .collect();
    let summary = DatasetSummary::from_files(&files);
    let cost = cfg.cost_model.estimate(summary.total_tokens);

    info!(
        all_valid = summary.all_valid,
        examples = summary.total_examples,
        tokens = summary.total_tokens,
        "done"
    );
    Ok(Outcome {
        files,
        summary,
        cost,
        report: cfg.report,
        min_recommended_examples: cfg.validator.min_recommended_examples,
    })
}

fn render(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(&outcome.json_report())
            .context("Failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    let rule = "=".repeat(80);
    println!("\n{rule}\n{BANNER}\n{rule}");
    for f in &outcome.files {
        print!("{}", FileReport::new(&f.name, &f.result, outcome.report));
    }
    print!(
        "{}",
        SummaryReport {
            summary: &outcome.summary,
            cost: outcome.cost,
            min_recommended_examples: outcome.min_recommended_examples,
        }
    );
    Ok(())
}

fn exit_status(outcome: &Result<Outcome>) -> u8 {
    match outcome {
        Ok(o) if o.summary.all_valid => EXIT_VALID,
        Ok(_) => EXIT_INVALID,
        Err(_) => EXIT_FAILURE,
    }
}
