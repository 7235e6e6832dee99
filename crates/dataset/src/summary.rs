use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{CostModel, ValidatorConfig};
use crate::validator::{validate_file, FileValidation};

/// A validation result tagged with the file it came from.
#[derive(Clone, Debug, Serialize)]
pub struct NamedValidation {
    pub name: String,
    pub path: PathBuf,
    pub result: FileValidation,
}

impl NamedValidation {
    pub fn validate(path: &Path, config: &ValidatorConfig) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path: path.to_path_buf(),
            result: validate_file(path, config),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub files: usize,
    pub training_examples: u64,
    pub validation_examples: u64,
    pub total_examples: u64,
    pub total_tokens: u64,
    pub all_valid: bool,
}

impl DatasetSummary {
    /// Training/validation split is inferred from the file name; every file
    /// contributes to the totals either way.
    pub fn from_files(files: &[NamedValidation]) -> Self {
        let mut s = Self {
            files: files.len(),
            training_examples: 0,
            validation_examples: 0,
            total_examples: 0,
            total_tokens: 0,
            all_valid: true,
        };
        for f in files {
            let examples = f.result.stats.valid_lines;
            let name = f.name.to_lowercase();
            if name.contains("training") {
                s.training_examples += examples;
            } else if name.contains("validation") {
                s.validation_examples += examples;
            }
            s.total_examples += examples;
            s.total_tokens += f.result.stats.total_tokens_estimate;
            s.all_valid &= f.result.is_valid;
        }
        s
    }
}

/// Training cost range: the low bound is one pass over the tokens, the high
/// bound allows for a second epoch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CostEstimate {
    pub low: f64,
    pub high: f64,
}

impl CostModel {
    pub fn estimate(&self, total_tokens: u64) -> CostEstimate {
        let low = (total_tokens as f64 / 1000.0) * self.cost_per_1k_tokens();
        CostEstimate { low, high: low * 2.0 }
    }
}
