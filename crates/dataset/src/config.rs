use std::num::NonZeroUsize;

use serde::Serialize;

use crate::error::ConfigError;

pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;
pub const DEFAULT_COST_PER_1K_TOKENS: f64 = 0.008;
pub const DEFAULT_MAX_DISPLAYED_ERRORS: usize = 20;
pub const DEFAULT_MIN_RECOMMENDED_EXAMPLES: u64 = 10;
pub const DEFAULT_MAX_DUPLICATE_RATE: f32 = 0.15;

/// Knobs for a single validation pass.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Characters per estimated token (1 token ~ 4 chars).
    pub chars_per_token: NonZeroUsize,
    /// Below this many counted records the quality report warns.
    pub min_recommended_examples: u64,
    /// Duplicate rate above which the quality report warns.
    pub max_duplicate_rate: f32,
}

impl ValidatorConfig {
    pub fn new(chars_per_token: NonZeroUsize) -> Self {
        Self { chars_per_token, ..Self::default() }
    }

    pub fn with_min_examples(mut self, n: u64) -> Self {
        self.min_recommended_examples = n;
        self
    }

    pub fn with_duplicate_threshold(mut self, rate: f32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidDuplicateThreshold(rate));
        }
        self.max_duplicate_rate = rate;
        Ok(self)
    }

    /// Rough token estimate for one message body: chars / chars_per_token.
    pub fn estimate_tokens(&self, content: &str) -> u64 {
        (content.chars().count() / self.chars_per_token.get()) as u64
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            chars_per_token: NonZeroUsize::new(DEFAULT_CHARS_PER_TOKEN).unwrap_or(NonZeroUsize::MIN),
            min_recommended_examples: DEFAULT_MIN_RECOMMENDED_EXAMPLES,
            max_duplicate_rate: DEFAULT_MAX_DUPLICATE_RATE,
        }
    }
}

/// Flat per-1k-token training price used for the cost range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CostModel {
    cost_per_1k_tokens: f64,
}

impl CostModel {
    pub fn new(cost_per_1k_tokens: f64) -> Result<Self, ConfigError> {
        if !cost_per_1k_tokens.is_finite() || cost_per_1k_tokens < 0.0 {
            return Err(ConfigError::InvalidCostRate(cost_per_1k_tokens));
        }
        Ok(Self { cost_per_1k_tokens })
    }

    pub fn cost_per_1k_tokens(&self) -> f64 {
        self.cost_per_1k_tokens
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self { cost_per_1k_tokens: DEFAULT_COST_PER_1K_TOKENS }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReportOptions {
    pub max_displayed_errors: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { max_displayed_errors: DEFAULT_MAX_DISPLAYED_ERRORS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_estimate_integer_division() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.estimate_tokens(&"a".repeat(40)), 10);
        assert_eq!(cfg.estimate_tokens(&"a".repeat(43)), 10);
        assert_eq!(cfg.estimate_tokens("abc"), 0);
    }

    #[test]
    fn test_token_estimate_counts_chars_not_bytes() {
        let cfg = ValidatorConfig::default();
        // 8 chars, 16 bytes
        assert_eq!(cfg.estimate_tokens("éééééééé"), 2);
    }

    #[test]
    fn test_token_estimate_custom_ratio() {
        let cfg = ValidatorConfig::new(NonZeroUsize::new(2).unwrap());
        assert_eq!(cfg.estimate_tokens(&"a".repeat(40)), 20);
    }

    #[test]
    fn test_cost_model_rejects_bad_rates() {
        assert!(CostModel::new(-0.1).is_err());
        assert!(CostModel::new(f64::NAN).is_err());
        assert!(CostModel::new(f64::INFINITY).is_err());
        assert_eq!(CostModel::new(0.0).unwrap().cost_per_1k_tokens(), 0.0);
    }

    #[test]
    fn test_duplicate_threshold_bounds() {
        assert!(ValidatorConfig::default().with_duplicate_threshold(1.5).is_err());
        let cfg = ValidatorConfig::default().with_duplicate_threshold(0.5).unwrap();
        assert_eq!(cfg.max_duplicate_rate, 0.5);
    }
}
