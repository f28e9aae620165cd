//! Batch calls: deduplication against the cache, ordering, and single-request semantics.

mod common;

use common::ScriptedClient;
use gptinference::cache::CacheValue;
use gptinference::client::Payload;
use gptinference::cost::InMemoryCostSink;
use gptinference::tokens::ModelPricing;
use gptinference::types::{Choice, RawResponse, Usage};
use gptinference::{BatchParams, Error, Prompt, Wrapper};
use std::sync::Arc;

fn legacy_wrapper(client: Arc<ScriptedClient>) -> Wrapper {
    Wrapper::builder()
        .shared_client(client)
        .pricing(ModelPricing::new("gpt-3", 20.0, 20.0))
        .build()
        .unwrap()
}

fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn only_uncached_prompts_are_sent() {
    let client = Arc::new(ScriptedClient::echo());
    let wrapper = legacy_wrapper(client.clone());
    let params = BatchParams::new("gpt-3");
    for p in ["a", "c"] {
        let key = wrapper.cache_key(&Prompt::text(p), &params);
        wrapper
            .store()
            .set(key, CacheValue::new(format!("{}'", p)));
    }
    let sink = InMemoryCostSink::new();

    let out = wrapper
        .call_batch(&prompts(&["a", "b", "a", "c"]), &params, &sink)
        .await
        .unwrap();

    assert_eq!(out, vec!["a'", "b'", "a'", "c'"]);
    assert_eq!(client.calls(), 1);
    assert_eq!(
        client.requests()[0].payload,
        Payload::Completion(vec!["b".into()])
    );
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!((records[0].input_tokens, records[0].output_tokens), (10, 5));
    assert!(!records[0].cache_hit);
}

#[tokio::test]
async fn duplicate_misses_are_sent_once() {
    let client = Arc::new(ScriptedClient::echo());
    let wrapper = legacy_wrapper(client.clone());
    let params = BatchParams::new("gpt-3");
    let sink = InMemoryCostSink::new();

    let out = wrapper
        .call_batch(&prompts(&["x", "y", " x", "x"]), &params, &sink)
        .await
        .unwrap();

    // completions are trimmed; " x" shares the key of "x"
    assert_eq!(out, vec!["x'", "y'", "x'", "x'"]);
    assert_eq!(
        client.requests()[0].payload,
        Payload::Completion(vec!["x".into(), "y".into()])
    );
    assert_eq!(wrapper.store().len(), 2);
    assert_eq!(sink.total_tokens(), (20, 10));

    // the second time round everything is cached
    let again = wrapper
        .call_batch(&prompts(&["y", "x"]), &params, &sink)
        .await
        .unwrap();
    assert_eq!(again, vec!["y'", "x'"]);
    assert_eq!(client.calls(), 1);
    let last = sink.records().pop().unwrap();
    assert!(last.cache_hit);
    assert_eq!(last.dollar_cost, 0.0);
}

#[tokio::test]
async fn empty_batch_does_nothing() {
    let client = Arc::new(ScriptedClient::echo());
    let wrapper = legacy_wrapper(client.clone());
    let sink = InMemoryCostSink::new();
    let out = wrapper
        .call_batch(&[], &BatchParams::new("gpt-3"), &sink)
        .await
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(client.calls(), 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn chat_batches_take_one_distinct_miss() {
    let client = Arc::new(ScriptedClient::echo());
    let wrapper = legacy_wrapper(client.clone());
    let params = BatchParams::new("gpt-4o");
    let sink = InMemoryCostSink::new();

    let out = wrapper
        .call_batch(&prompts(&["q", "q"]), &params, &sink)
        .await
        .unwrap();
    assert_eq!(out, vec!["q'", "q'"]);
    assert!(client.requests()[0].payload.is_chat());

    let err = wrapper
        .call_batch(&prompts(&["q", "r", "s"]), &params, &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(client.calls(), 1);
    assert_eq!(wrapper.store().len(), 1);
}

#[tokio::test]
async fn choice_count_mismatch_is_malformed() {
    let client = Arc::new(ScriptedClient::new(|_, _| {
        Ok(RawResponse::new(
            vec![Choice::completion("only one")],
            Usage {
                prompt_tokens: 20,
                completion_tokens: 3,
            },
        ))
    }));
    let wrapper = legacy_wrapper(client.clone());
    let sink = InMemoryCostSink::new();

    let err = wrapper
        .call_batch(&prompts(&["a", "b"]), &BatchParams::new("gpt-3"), &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert!(wrapper.store().is_empty());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn unpriced_batch_engine_stores_nothing() {
    let client = Arc::new(ScriptedClient::echo());
    let wrapper = Wrapper::builder()
        .shared_client(client.clone())
        .build()
        .unwrap();
    let err = wrapper
        .call_batch(
            &prompts(&["a", "b"]),
            &BatchParams::new("gpt-3"),
            &gptinference::NoopCostSink,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPricing { .. }));
    assert_eq!(client.calls(), 1);
    assert!(wrapper.store().is_empty());
}
