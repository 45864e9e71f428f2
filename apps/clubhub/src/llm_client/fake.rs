//! Scripted `LanguageModel` double for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, CompletionRequest, LanguageModel, LlmError, TokenUsage};

/// Replays queued results in order and records every request it receives.
/// Running out of script is reported as an API error.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(Completion {
            text: text.to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: Some(100),
                response_tokens: Some(20),
                total_tokens: Some(120),
            }),
        }))
    }

    pub fn reply_without_usage(self, text: &str) -> Self {
        self.push(Ok(Completion {
            text: text.to_string(),
            usage: None,
        }))
    }

    pub fn fail(self, status: u16, message: &str) -> Self {
        self.push(Err(LlmError::Api {
            status,
            message: message.to_string(),
        }))
    }

    fn push(self, result: Result<Completion, LlmError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                })
            })
    }
}
