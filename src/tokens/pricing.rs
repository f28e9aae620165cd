//! Engine pricing and dollar cost calculation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, Result};

const TOKENS_PER_UNIT: f64 = 1_000_000.0;

/// Dollar prices of one engine, per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub engine: String,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

impl ModelPricing {
    pub fn new(engine: impl Into<String>, input_per_1m: f64, output_per_1m: f64) -> Self {
        Self {
            engine: engine.into(),
            input_per_1m,
            output_per_1m,
        }
    }

    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 / TOKENS_PER_UNIT) * self.input_per_1m
            + (output_tokens as f64 / TOKENS_PER_UNIT) * self.output_per_1m
    }
}

static DEFAULT_TABLE: Lazy<PricingTable> = Lazy::new(|| {
    PricingTable::empty()
        .with(ModelPricing::new("gpt-3.5-turbo", 0.5, 1.5))
        .with(ModelPricing::new("gpt-4", 30.0, 60.0))
        .with(ModelPricing::new("gpt-4-turbo", 10.0, 30.0))
        .with(ModelPricing::new("gpt-4o", 5.0, 15.0))
});

/// Engine name to pricing. Names match exactly.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: HashMap<String, ModelPricing>,
}

impl PricingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in OpenAI prices.
    pub fn defaults() -> Self {
        DEFAULT_TABLE.clone()
    }

    pub fn with(mut self, pricing: ModelPricing) -> Self {
        self.register(pricing);
        self
    }

    /// Add or replace the pricing of one engine.
    pub fn register(&mut self, pricing: ModelPricing) {
        self.entries.insert(pricing.engine.clone(), pricing);
    }

    pub fn get(&self, engine: &str) -> Option<&ModelPricing> {
        self.entries.get(engine)
    }

    pub fn cost(&self, engine: &str, input_tokens: u32, output_tokens: u32) -> Result<f64> {
        self.get(engine)
            .map(|p| p.cost(input_tokens, output_tokens))
            .ok_or_else(|| Error::UnknownPricing {
                engine: engine.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dollar cost of a call against the built-in price list.
pub fn cost_in_dollars(input_tokens: u32, output_tokens: u32, engine: &str) -> Result<f64> {
    DEFAULT_TABLE.cost(engine, input_tokens, output_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_million_each_on_gpt4() {
        assert_eq!(cost_in_dollars(1_000_000, 1_000_000, "gpt-4").unwrap(), 90.0);
    }

    #[test]
    fn default_prices() {
        assert_eq!(cost_in_dollars(1_000_000, 0, "gpt-3.5-turbo").unwrap(), 0.5);
        assert_eq!(cost_in_dollars(0, 1_000_000, "gpt-4-turbo").unwrap(), 30.0);
        assert_eq!(cost_in_dollars(2_000_000, 1_000_000, "gpt-4o").unwrap(), 25.0);
        assert_eq!(cost_in_dollars(0, 0, "gpt-4").unwrap(), 0.0);
    }

    #[test]
    fn unknown_engine_is_an_error() {
        let err = cost_in_dollars(10, 10, "gpt-3").unwrap_err();
        assert!(matches!(err, Error::UnknownPricing { ref engine } if engine == "gpt-3"));
        // no prefix matching
        assert!(cost_in_dollars(10, 10, "gpt-4o-mini").is_err());
    }

    #[test]
    fn registered_engines_extend_the_defaults() {
        let mut table = PricingTable::defaults();
        table.register(ModelPricing::new("gpt-3", 20.0, 20.0));
        assert_eq!(table.len(), 5);
        assert_eq!(table.cost("gpt-3", 500_000, 500_000).unwrap(), 20.0);
        assert!(PricingTable::empty().cost("gpt-4", 1, 1).is_err());
    }
}
