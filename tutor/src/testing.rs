//! In-process gateway double for tests, also exported under the `test-util` feature.

use async_trait::async_trait;
use mentoria_core::{GeminiError, GeminiResult, ModelGateway};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Step {
    delay: Duration,
    outcome: GeminiResult<String>,
}

/// Replays queued replies in order and records every prompt it receives.
/// Once the queue is empty it answers with a fixed fallback text.
#[derive(Default)]
pub struct ScriptedGateway {
    steps: Mutex<VecDeque<Step>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        let gateway = Self::new();
        for reply in replies {
            gateway.push_reply(reply);
        }
        gateway
    }

    pub fn push_reply(&self, reply: &str) {
        self.push(Duration::ZERO, Ok(reply.to_string()));
    }

    pub fn push_delayed_reply(&self, delay: Duration, reply: &str) {
        self.push(delay, Ok(reply.to_string()));
    }

    pub fn push_error(&self, error: GeminiError) {
        self.push(Duration::ZERO, Err(error));
    }

    fn push(&self, delay: Duration, outcome: GeminiResult<String>) {
        lock(&self.steps).push_back(Step { delay, outcome });
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn last_prompt(&self) -> String {
        lock(&self.prompts).last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str) -> GeminiResult<String> {
        lock(&self.prompts).push(prompt.to_string());
        let step = lock(&self.steps).pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.outcome
            }
            None => Ok("respuesta del modelo".to_string()),
        }
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
