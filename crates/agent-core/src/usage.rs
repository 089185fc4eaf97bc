//! Token accounting and per-model pricing.

use serde::{Deserialize, Serialize};

/// Model used when settings name none.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20251101";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub model: &'static str,
    /// USD per million input tokens.
    pub input_per_mtok: f64,
    /// USD per million output tokens.
    pub output_per_mtok: f64,
}

/// Known models. The first entry is the fallback for unknown identifiers.
pub const PRICING: &[ModelPricing] = &[
    ModelPricing {
        model: "claude-sonnet-4-5-20251101",
        input_per_mtok: 3.0,
        output_per_mtok: 15.0,
    },
    ModelPricing {
        model: "claude-opus-4-6-20250205",
        input_per_mtok: 5.0,
        output_per_mtok: 25.0,
    },
    ModelPricing {
        model: "claude-haiku-4-5-20251001",
        input_per_mtok: 1.0,
        output_per_mtok: 5.0,
    },
];

pub fn pricing_for(model: &str) -> &'static ModelPricing {
    PRICING
        .iter()
        .find(|entry| entry.model == model)
        .unwrap_or(&PRICING[0])
}

pub fn is_known_model(model: &str) -> bool {
    PRICING.iter().any(|entry| entry.model == model)
}

/// Running token totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }

    pub fn cost_usd(&self, model: &str) -> f64 {
        let pricing = pricing_for(model);
        (self.input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok
            + (self.output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok
    }
}

/// `$0.0123` style rendering.
pub fn format_cost(cost_usd: f64) -> String {
    format!("${cost_usd:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_follows_model_table() {
        let usage = TokenUsage::new(1_000_000, 100_000);
        assert!((usage.cost_usd("claude-sonnet-4-5-20251101") - 4.5).abs() < 1e-9);
        assert!((usage.cost_usd("claude-opus-4-6-20250205") - 7.5).abs() < 1e-9);
        assert!((usage.cost_usd("claude-haiku-4-5-20251001") - 1.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_uses_first_entry() {
        assert_eq!(pricing_for("gpt-whatever").model, DEFAULT_MODEL);
        assert!(!is_known_model("gpt-whatever"));
    }

    #[test]
    fn accumulation_is_monotonic() {
        let mut total = TokenUsage::default();
        total.accumulate(TokenUsage::new(10, 2));
        total.accumulate(TokenUsage::new(0, 0));
        total.accumulate(TokenUsage::new(5, 1));
        assert_eq!(total, TokenUsage::new(15, 3));
        assert_eq!(format_cost(0.000_0451), "$0.0000");
        assert_eq!(format_cost(1.23456), "$1.2346");
    }
}
