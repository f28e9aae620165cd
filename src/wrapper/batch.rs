use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{validate_engine, BatchParams, Wrapper};
use crate::cache::{CacheKey, CacheValue};
use crate::client::{is_chat_engine, GenerationClient, GenerationRequest, Payload};
use crate::cost::{CallCost, CostSink};
use crate::types::{Message, Prompt};
use crate::{Error, ErrorContext, Result};

impl Wrapper {
    /// Complete several prompts with one provider request for everything not yet cached.
    ///
    /// Results come back in input order, duplicates included. Prompts missing from the cache
    /// are sent once each, in first-occurrence order. When everything is cached no request is
    /// made. One [`CallCost`] is reported for the whole batch.
    ///
    /// Chat engines complete one conversation per request, so a chat batch may have at most one
    /// distinct miss.
    pub async fn call_batch(
        &self,
        prompts: &[String],
        params: &BatchParams,
        sink: &dyn CostSink,
    ) -> Result<Vec<String>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }
        validate_engine(&params.engine)?;

        let keys: Vec<CacheKey> = prompts
            .iter()
            .map(|p| self.cache_key(&Prompt::text(p.as_str()), params))
            .collect();

        let mut resolved: HashMap<CacheKey, String> = HashMap::new();
        let mut misses: Vec<(CacheKey, &str)> = Vec::new();
        let mut seen: HashSet<&CacheKey> = HashSet::new();
        for (key, prompt) in keys.iter().zip(prompts) {
            if !seen.insert(key) {
                continue;
            }
            match self.store.get(key) {
                Some(hit) => {
                    resolved.insert(key.clone(), hit.first_response);
                }
                None => misses.push((key.clone(), prompt.as_str())),
            }
        }
        debug!(
            prompts = prompts.len(),
            hits = resolved.len(),
            misses = misses.len(),
            engine = %params.engine,
            "batch lookup"
        );

        if misses.is_empty() {
            sink.report(CallCost::free(&params.engine));
        } else {
            let chat = is_chat_engine(&params.engine);
            let payload = batch_payload(&misses, chat)?;
            let generation = GenerationRequest {
                engine: params.engine.clone(),
                payload,
                max_tokens: params.max_tokens,
                stop_token: params.stop_token.clone(),
                temperature: params.temperature,
                n: 1,
            };
            let response = self.client.generate(&generation).await?;
            let completions = response.all_texts(chat)?;
            if completions.len() != misses.len() {
                return Err(Error::malformed(format!(
                    "sent {} prompts but received {} completions",
                    misses.len(),
                    completions.len()
                )));
            }
            let cost = self.price(&params.engine, &response.usage)?;

            for ((key, _), completion) in misses.into_iter().zip(completions) {
                let stored = self
                    .store
                    .set(key.clone(), CacheValue::new(completion.trim()));
                resolved.insert(key, stored.first_response);
            }
            sink.report(cost);
        }

        keys.iter()
            .map(|key| {
                resolved
                    .get(key)
                    .cloned()
                    .ok_or_else(|| Error::malformed(format!("no completion for {}", key)))
            })
            .collect()
    }
}

fn batch_payload(misses: &[(CacheKey, &str)], chat: bool) -> Result<Payload> {
    if !chat {
        return Ok(Payload::Completion(
            misses.iter().map(|(_, p)| p.to_string()).collect(),
        ));
    }
    match misses {
        [(_, prompt)] => Ok(Payload::Chat(vec![Message::user(*prompt)])),
        _ => Err(Error::validation_with_context(
            format!(
                "chat engines complete one prompt per request, batch has {} uncached prompts",
                misses.len()
            ),
            ErrorContext::new()
                .with_field_path("prompts")
                .with_details("use the legacy completion engine for multi-prompt batches"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prompt;

    fn key(p: &str) -> CacheKey {
        CacheKey::new("gpt-4", &Prompt::text(p), "###", 0.0, 300)
    }

    #[test]
    fn legacy_batches_keep_miss_order() {
        let misses = vec![(key("b"), "b"), (key("c"), "c")];
        assert_eq!(
            batch_payload(&misses, false).unwrap(),
            Payload::Completion(vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn chat_batches_allow_a_single_miss() {
        let one = vec![(key("b"), "b")];
        assert!(batch_payload(&one, true).unwrap().is_chat());
        let two = vec![(key("b"), "b"), (key("c"), "c")];
        assert!(matches!(
            batch_payload(&two, true),
            Err(Error::Validation { .. })
        ));
    }
}
