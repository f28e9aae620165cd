//! # Pricing Module
//!
//! Converts token usage reported by the provider into dollars.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ModelPricing`] | Input and output price of one engine, per million tokens |
//! | [`PricingTable`] | Engine name to pricing, extensible at build time |
//! | [`cost_in_dollars`] | Cost against the built-in price list |
//!
//! ## Example
//!
//! ```rust
//! use gptinference::tokens::{cost_in_dollars, ModelPricing, PricingTable};
//!
//! assert_eq!(cost_in_dollars(1_000_000, 1_000_000, "gpt-4").unwrap(), 90.0);
//!
//! let table = PricingTable::defaults().with(ModelPricing::new("gpt-3", 20.0, 20.0));
//! assert!(table.cost("gpt-3", 1000, 100).is_ok());
//! ```
//!
//! Engines missing from the table are an error, never a zero cost.

mod pricing;

pub use pricing::{cost_in_dollars, ModelPricing, PricingTable};
