//! Claim / Abstract Takeaway Example
//!
//! Asks two engines whether a research abstract relates to a claim, and what the abstract's
//! main point is in relation to it. Answers are cached in `cache.jsonl` (or the path given as
//! the first argument), so a second run costs nothing and works without an API key.
//!
//! Run with: RUST_LOG=gptinference=debug cargo run --example claim_takeaway

use anyhow::Result;
use gptinference::extract::split_answer_pair;
use gptinference::{CallRequest, InMemoryCostSink, Message, Prompt, Wrapper};
use tracing_subscriber::EnvFilter;

const ABSTRACT: &str = "It would occupy a long time to give an account of the progress of cholera \
over different parts of the world, with the devastation it has caused in some places, whilst it \
has passed lightly over others, or left them untouched. It travels along the great tracks of \
human intercourse, never going faster than people travel, and generally much more slowly. In \
extending to a fresh island or continent, it always appears first at a sea-port.";

fn takeaway_query(claim: &str, abstract_text: &str) -> Prompt {
    Prompt::text(format!(
        "\nClaim: {claim}\n\nAbstract: {abstract_text}\n\n\
         Now, answer these two questions:\n\
         Q1. Is the claim and abstract related or unrelated?\n\
         Q2. How can someone accurately extract the main point of the abstract in relation to \
         the claim?(Only extract detail about the salient relation. Do NOT provide any stance \
         about the claim. )\n"
    ))
}

fn takeaway_chat(claim: &str, abstract_text: &str) -> Prompt {
    Prompt::conversation(vec![
        Message::system("You are an expert scientist who understand claims made in research papers."),
        Message::user(format!(
            "Claim: {claim}\n\nAbstract: {abstract_text}\n\n\
             Answer in two paragraphs separated by a blank line: is the abstract related to the \
             claim, and what is its main point in relation to the claim?"
        )),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gptinference=info")),
        )
        .init();

    let cache_path = std::env::args().nth(1).unwrap_or_else(|| "cache.jsonl".to_string());
    let wrapper = Wrapper::builder().cache_path(&cache_path).build()?;
    let costs = InMemoryCostSink::new();

    let claims = [
        ("snow makes people sick.", false),
        ("snow does not make people sick.", false),
        ("snow cannot make people sick.", true),
    ];
    for (claim, chat) in claims {
        println!("claim: {claim}");
        let prompt = if chat {
            takeaway_chat(claim, ABSTRACT)
        } else {
            takeaway_query(claim, ABSTRACT)
        };
        for engine in ["gpt-4-turbo", "gpt-3.5-turbo"] {
            let request = CallRequest::new(prompt.clone(), engine).with_max_tokens(500);
            let generated = wrapper.call(&request, &costs).await?;
            let answers = split_answer_pair(&generated);
            println!("  [{engine}] relation: {}", answers.first);
            println!("  [{engine}] takeaway: {}", answers.second.trim());
        }
    }

    let stats = wrapper.stats();
    let (input, output) = costs.total_tokens();
    println!(
        "\n{} calls, {} cache hits, {} input / {} output tokens, ${:.4}",
        costs.len(),
        stats.hits,
        input,
        output,
        costs.total_dollars()
    );
    wrapper.flush()?;
    Ok(())
}
