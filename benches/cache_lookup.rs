//! Benchmarks for the request cache
//!
//! This benchmark measures:
//! - Cache key construction for text and conversation prompts
//! - Lookup latency on a warm store
//! - Replay of a cache log at startup

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use gptinference::cache::{CacheConfig, CacheKey, CacheStore, CacheValue};
use gptinference::types::{Message, Prompt};

fn text_prompt(i: usize) -> Prompt {
    Prompt::text(format!(
        "\nClaim: snow makes people sick ({i}).\nAbstract: It would occupy a long time to give an account of the progress of cholera.\nA1."
    ))
}

fn conversation_prompt(i: usize) -> Prompt {
    Prompt::conversation(vec![
        Message::system("You are an expert scientist who understand claims made in research papers."),
        Message::user(format!("Tell me fun things to do in San Francisco ({i}).")),
    ])
}

fn key(prompt: &Prompt) -> CacheKey {
    CacheKey::new("gpt-4-turbo", prompt, "###", 0.0, 500)
}

fn warm_store(entries: usize) -> CacheStore {
    let store = CacheStore::in_memory();
    for i in 0..entries {
        store
            .set(key(&text_prompt(i)), CacheValue::new("A1. related\n\nA2. takeaway"));
    }
    store
}

fn bench_key_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_construction");
    let text = text_prompt(7);
    let convo = conversation_prompt(7);

    group.bench_function("text", |b| b.iter(|| key(black_box(&text))));
    group.bench_function("conversation", |b| b.iter(|| key(black_box(&convo))));
    group.bench_function("fingerprint", |b| {
        let k = key(&text);
        b.iter(|| black_box(&k).fingerprint())
    });
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    for size in [100usize, 10_000] {
        let store = warm_store(size);
        let hit = key(&text_prompt(size / 2));
        let miss = key(&text_prompt(size + 1));
        group.bench_with_input(BenchmarkId::new("hit", size), &hit, |b, k| {
            b.iter(|| store.get(black_box(k)))
        });
        group.bench_with_input(BenchmarkId::new("miss", size), &miss, |b, k| {
            b.iter(|| store.get(black_box(k)))
        });
    }
    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cache.jsonl");
    let entries = 5_000;
    {
        let store = CacheStore::open(CacheConfig::new().with_path(&path)).expect("open");
        for i in 0..entries {
            store
                .set(key(&text_prompt(i)), CacheValue::new("A1. related\n\nA2. takeaway"));
        }
        store.flush().expect("flush");
    }

    group.throughput(Throughput::Elements(entries as u64));
    group.bench_function("open_5k", |b| {
        b.iter(|| CacheStore::open(CacheConfig::new().with_path(&path)).expect("open"))
    });
    group.finish();
}

criterion_group!(benches, bench_key_construction, bench_lookup, bench_replay);
criterion_main!(benches);
