#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use task_converter_rs::llm::{CompletionRequest, LLMResponse, ProviderAdapter, ProviderError};
use task_converter_rs::storage::{KeyValueStore, MemoryStore};
use task_converter_rs::{Converter, ConverterConfig};

pub const LOGIN_BUG: &str = "Title: Bug: Login fails\nDescription: Users cannot log in\nwith valid credentials.\nAcceptance Criteria:\n- Error message is clear\n- Retry works";

/// Replays canned completions and keeps every request it was sent.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl ProviderAdapter for ScriptedProvider {
    fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        self.seen.lock().unwrap().push(request);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LOGIN_BUG.to_string()));
        next.map(|content| LLMResponse {
            content,
            model: Some("scripted".to_string()),
        })
    }
}

pub fn test_config() -> ConverterConfig {
    ConverterConfig {
        ready_delay: Duration::ZERO,
        ..ConverterConfig::default()
    }
}

pub fn converter_with(
    replies: Vec<Result<String, ProviderError>>,
) -> (Converter, Arc<ScriptedProvider>, Arc<dyn KeyValueStore>) {
    converter_with_config(test_config(), replies)
}

pub fn converter_with_config(
    config: ConverterConfig,
    replies: Vec<Result<String, ProviderError>>,
) -> (Converter, Arc<ScriptedProvider>, Arc<dyn KeyValueStore>) {
    let provider = Arc::new(ScriptedProvider::new(replies));
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let converter = Converter::new(config, provider.clone(), store.clone());
    (converter, provider, store)
}
