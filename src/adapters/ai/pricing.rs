//! Static per-model price table used for cost estimates in logs.

/// USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPrice {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn cost_usd(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (f64::from(input_tokens) * self.input_per_million
            + f64::from(output_tokens) * self.output_per_million)
            / 1_000_000.0
    }
}

/// Rows are matched by model prefix, first match wins, so longer prefixes
/// come before shorter ones.
const PRICE_TABLE: &[(&str, ModelPrice)] = &[
    ("claude-opus", ModelPrice::new(15.0, 75.0)),
    ("claude-sonnet", ModelPrice::new(3.0, 15.0)),
    ("claude-3-5-sonnet", ModelPrice::new(3.0, 15.0)),
    ("claude-3-5-haiku", ModelPrice::new(0.8, 4.0)),
    ("claude-haiku", ModelPrice::new(0.8, 4.0)),
    ("gpt-4o-mini", ModelPrice::new(0.15, 0.6)),
    ("gpt-4o", ModelPrice::new(2.5, 10.0)),
    ("gpt-4.1-mini", ModelPrice::new(0.4, 1.6)),
    ("gpt-4.1", ModelPrice::new(2.0, 8.0)),
    ("gpt-4-turbo", ModelPrice::new(10.0, 30.0)),
    ("gpt-4", ModelPrice::new(30.0, 60.0)),
    ("gpt-3.5", ModelPrice::new(0.5, 1.5)),
];

/// Used for models missing from the table.
pub const DEFAULT_PRICE: ModelPrice = ModelPrice::new(3.0, 15.0);

pub fn price_for(model: &str) -> ModelPrice {
    PRICE_TABLE
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_PRICE)
}

/// Estimated USD cost of one call.
pub fn estimate_cost_usd(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    price_for(model).cost_usd(input_tokens, output_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_is_listed_first() {
        assert_eq!(price_for("gpt-4o-mini-2024-07-18"), ModelPrice::new(0.15, 0.6));
        assert_eq!(price_for("gpt-4o-2024-08-06"), ModelPrice::new(2.5, 10.0));
        assert_eq!(price_for("gpt-4-0613"), ModelPrice::new(30.0, 60.0));
    }

    #[test]
    fn unknown_model_uses_default_row() {
        assert_eq!(price_for("mistral-large"), DEFAULT_PRICE);
    }

    #[test]
    fn cost_is_per_million_tokens() {
        let cost = estimate_cost_usd("claude-sonnet-4-20250514", 1_000_000, 100_000);
        assert!((cost - 4.5).abs() < 1e-9);
        assert_eq!(estimate_cost_usd("gpt-4o", 0, 0), 0.0);
    }
}
