//! Human-readable reports. Pure formatting over validation results.

use std::fmt;

use crate::config::ReportOptions;
use crate::schema::Role;
use crate::summary::{CostEstimate, DatasetSummary};
use crate::validator::FileValidation;

const RULE_WIDTH: usize = 80;

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn rule(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    writeln!(f, "{}", ch.to_string().repeat(RULE_WIDTH))
}

pub struct FileReport<'a> {
    pub name: &'a str,
    pub result: &'a FileValidation,
    pub options: ReportOptions,
}

impl<'a> FileReport<'a> {
    pub fn new(name: &'a str, result: &'a FileValidation, options: ReportOptions) -> Self {
        Self { name, result, options }
    }
}

impl fmt::Display for FileReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let res = self.result;
        let stats = &res.stats;

        writeln!(f)?;
        rule(f, '=')?;
        writeln!(f, "VALIDATION RESULTS: {}", self.name)?;
        rule(f, '=')?;

        if res.is_valid {
            writeln!(f, "\n✅ File is VALID and ready for fine-tuning!\n")?;
        } else {
            writeln!(f, "\n❌ File has {} validation error(s)\n", res.errors.len())?;
        }

        writeln!(f, "Statistics:")?;
        writeln!(f, "  Total lines: {}", stats.total_lines)?;
        writeln!(f, "  Valid conversation lines: {}", stats.valid_lines)?;
        writeln!(f, "  Total messages: {}", stats.total_messages)?;
        writeln!(f, "  Estimated tokens: ~{}", group_thousands(stats.total_tokens_estimate))?;
        writeln!(f, "\nRole distribution:")?;
        writeln!(f, "  System messages: {}", stats.role_count(Role::System))?;
        writeln!(f, "  User messages: {}", stats.role_count(Role::User))?;
        writeln!(f, "  Assistant messages: {}", stats.role_count(Role::Assistant))?;

        if let Some(q) = &res.quality {
            writeln!(f, "\nDataset quality:")?;
            writeln!(f, "  BLAKE3: {}", q.dataset_hash_hex())?;
            writeln!(f, "  Duplicate records: {} ({:.2})", q.duplicate_records, q.duplicate_rate)?;
            writeln!(f, "  Records without system message: {}", q.records_without_system)?;
            for w in &q.warnings {
                writeln!(f, "  ⚠ {w}")?;
            }
        }

        if !res.errors.is_empty() {
            writeln!(f)?;
            rule(f, '-')?;
            writeln!(f, "ERRORS:")?;
            rule(f, '-')?;
            let shown = self.options.max_displayed_errors;
            for e in res.errors.iter().take(shown) {
                writeln!(f, "  • {e}")?;
            }
            if res.errors.len() > shown {
                writeln!(f, "\n  ... and {} more errors", res.errors.len() - shown)?;
            }
        }

        writeln!(f)?;
        rule(f, '=')
    }
}

pub struct SummaryReport<'a> {
    pub summary: &'a DatasetSummary,
    pub cost: CostEstimate,
    pub min_recommended_examples: u64,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;

        rule(f, '=')?;
        writeln!(f, "OVERALL SUMMARY")?;
        rule(f, '=')?;
        writeln!(f, "\nTraining examples: {}", s.training_examples)?;
        writeln!(f, "Validation examples: {}", s.validation_examples)?;
        writeln!(f, "Total examples: {}", s.total_examples)?;
        writeln!(f, "Estimated total tokens: ~{}", group_thousands(s.total_tokens))?;

        if s.all_valid {
            writeln!(f, "\n✅ All datasets are VALID and ready for fine-tuning!")?;
            writeln!(f, "\nRecommendations:")?;
            writeln!(f, "  • Minimum {} examples recommended", self.min_recommended_examples)?;
            writeln!(f, "  • Consider adding more examples for better performance")?;
            writeln!(f, "  • Ensure diverse coverage of the target domain")?;
        } else {
            writeln!(f, "\n❌ Some datasets have errors. Please fix them before fine-tuning.")?;
        }

        writeln!(f)?;
        rule(f, '=')?;
        writeln!(f)?;
        writeln!(
            f,
            "💰 Estimated fine-tuning cost: ${:.2} - ${:.2}",
            self.cost.low, self.cost.high
        )?;
        writeln!(f, "   (Actual cost depends on epochs, batch size, and provider pricing)")?;
        writeln!(f)?;
        rule(f, '=')
    }
}
