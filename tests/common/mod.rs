//! Shared test doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use gptinference::client::{GenerationClient, GenerationRequest, Payload};
use gptinference::types::{Choice, RawResponse, Usage};
use gptinference::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&GenerationRequest, usize) -> Result<RawResponse> + Send + Sync>;

/// Generation client that records every request and answers from a closure.
///
/// The closure gets the request and the zero-based attempt number.
pub struct ScriptedClient {
    requests: Mutex<Vec<GenerationRequest>>,
    attempts: AtomicUsize,
    responder: Responder,
}

impl ScriptedClient {
    pub fn new(
        responder: impl Fn(&GenerationRequest, usize) -> Result<RawResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            responder: Box::new(responder),
        }
    }

    /// Answers every prompt with the prompt followed by `'`.
    /// Usage is 10 prompt and 5 completion tokens per prompt.
    pub fn echo() -> Self {
        Self::new(|req, _| Ok(echo(req)))
    }

    pub fn failing(err: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        Self::new(move |_, _| Err(err()))
    }

    pub fn calls(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request, attempt)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn echo(req: &GenerationRequest) -> RawResponse {
    match &req.payload {
        Payload::Chat(messages) => {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            RawResponse::new(
                vec![Choice::chat(format!("{}'", last))],
                Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                },
            )
        }
        Payload::Completion(prompts) => {
            let n = prompts.len() as u32;
            RawResponse::new(
                prompts
                    .iter()
                    .map(|p| Choice::completion(format!(" {}'\n", p)))
                    .collect(),
                Usage {
                    prompt_tokens: 10 * n,
                    completion_tokens: 5 * n,
                },
            )
        }
    }
}
