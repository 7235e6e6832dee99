use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "validate-dataset")]
#[command(about = "Validate chat-format JSONL fine-tuning datasets", long_about = None)]
pub struct Cli {
    /// Dataset files (defaults to the configured training and validation files)
    pub files: Vec<PathBuf>,

    /// Print one JSON document instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Errors shown per file before truncating
    #[arg(long)]
    pub max_errors: Option<usize>,

    /// Characters per estimated token
    #[arg(long)]
    pub chars_per_token: Option<NonZeroUsize>,

    /// Training price per 1000 tokens
    #[arg(long)]
    pub cost_per_1k: Option<f64>,
}
