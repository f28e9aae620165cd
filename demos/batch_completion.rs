//! Batch Completion Example
//!
//! Completes several prompts against the legacy completion engine in one request. Prompts
//! already in the cache are not sent again, and duplicates are sent once.
//!
//! The legacy engine has no built-in price, so this example registers one.
//!
//! Run with: OPENAI_API_KEY=... cargo run --example batch_completion

use anyhow::Result;
use gptinference::tokens::ModelPricing;
use gptinference::{BatchParams, LastCallSink, Wrapper};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gptinference=debug")),
        )
        .init();

    let wrapper = Wrapper::builder()
        .cache_path("batch_cache.jsonl")
        .save_every(Duration::from_secs(30))
        .pricing(ModelPricing::new("gpt-3", 20.0, 20.0))
        .build()?;

    let prompts: Vec<String> = [
        "The capital of France is",
        "The tallest mountain on Earth is",
        "The capital of France is",
        "Water boils at sea level at",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let params = BatchParams::new("gpt-3").with_max_tokens(16).with_stop_token("\n");

    let cost = LastCallSink::new();
    let answers = wrapper.call_batch(&prompts, &params, &cost).await?;
    for (prompt, answer) in prompts.iter().zip(&answers) {
        println!("{prompt} ... {answer}");
    }
    if let Some(c) = cost.last() {
        println!(
            "\nbatch cost: ${:.6} ({} in / {} out, cached: {})",
            c.dollar_cost, c.input_tokens, c.output_tokens, c.cache_hit
        );
    }
    Ok(())
}
