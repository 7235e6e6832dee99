use std::fmt::Display;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use dataset::{
    CostModel, ReportOptions, ValidatorConfig, DEFAULT_CHARS_PER_TOKEN, DEFAULT_COST_PER_1K_TOKENS,
    DEFAULT_MAX_DISPLAYED_ERRORS, DEFAULT_MAX_DUPLICATE_RATE, DEFAULT_MIN_RECOMMENDED_EXAMPLES,
};

use crate::cli::Cli;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub dataset_dir: PathBuf,
    pub training_file: String,
    pub validation_file: String,

    pub validator: ValidatorConfig,
    pub cost_model: CostModel,
    pub report: ReportOptions,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dataset_dir = PathBuf::from(lookup("DATASET_DIR").unwrap_or_else(|| "data".to_string()));
        let training_file =
            lookup("DATASET_TRAINING_FILE").unwrap_or_else(|| "training.jsonl".to_string());
        let validation_file =
            lookup("DATASET_VALIDATION_FILE").unwrap_or_else(|| "validation.jsonl".to_string());

        let chars_per_token = parsed(&lookup, "DATASET_CHARS_PER_TOKEN", || {
            NonZeroUsize::new(DEFAULT_CHARS_PER_TOKEN).unwrap_or(NonZeroUsize::MIN)
        })?;
        let min_examples =
            parsed(&lookup, "DATASET_MIN_EXAMPLES", || DEFAULT_MIN_RECOMMENDED_EXAMPLES)?;
        let max_duplicate_rate =
            parsed(&lookup, "DATASET_MAX_DUPLICATE_RATE", || DEFAULT_MAX_DUPLICATE_RATE)?;
        let cost_per_1k_tokens =
            parsed(&lookup, "DATASET_COST_PER_1K_TOKENS", || DEFAULT_COST_PER_1K_TOKENS)?;
        let max_displayed_errors =
            parsed(&lookup, "DATASET_MAX_DISPLAYED_ERRORS", || DEFAULT_MAX_DISPLAYED_ERRORS)?;

        // Tiny sanity checks (fail fast, fail loud)
        if training_file.trim().is_empty() || validation_file.trim().is_empty() {
            bail!("DATASET_TRAINING_FILE and DATASET_VALIDATION_FILE must not be empty");
        }

        let validator = ValidatorConfig::new(chars_per_token)
            .with_min_examples(min_examples)
            .with_duplicate_threshold(max_duplicate_rate)
            .map_err(|e| anyhow!("DATASET_MAX_DUPLICATE_RATE: {e}"))?;
        let cost_model = CostModel::new(cost_per_1k_tokens)
            .map_err(|e| anyhow!("DATASET_COST_PER_1K_TOKENS: {e}"))?;

        Ok(Self {
            dataset_dir,
            training_file,
            validation_file,
            validator,
            cost_model,
            report: ReportOptions { max_displayed_errors },
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(k) = cli.chars_per_token {
            self.validator.chars_per_token = k;
        }
        if let Some(r) = cli.cost_per_1k {
            self.cost_model = CostModel::new(r).map_err(|e| anyhow!("--cost-per-1k: {e}"))?;
        }
        if let Some(n) = cli.max_errors {
            self.report.max_displayed_errors = n;
        }
        Ok(())
    }

    /// Training file, then validation file.
    pub fn default_files(&self) -> Vec<PathBuf> {
        vec![
            self.dataset_dir.join(&self.training_file),
            self.dataset_dir.join(&self.validation_file),
        ]
    }
}

fn parsed<T, F>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: F) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid value for env var {key} ({raw:?}): {e}")),
        None => Ok(default()),
    }
}
