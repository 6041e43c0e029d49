use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ConverterConfig;
use crate::converter::Converter;
use crate::error::ConverterError;
use crate::llm::{OpenAIAdapter, OpenAIConfig};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_opt(key).and_then(|raw| raw.parse::<T>().ok())
}

pub fn config_from_env() -> ConverterConfig {
    let mut cfg = ConverterConfig::default();
    if let Some(url) = env_opt("TASK_CONVERTER_API_URL") {
        cfg.api_url = url;
    }
    if let Some(model) = env_opt("TASK_CONVERTER_MODEL") {
        cfg.model = model;
    }
    if let Some(max_tokens) = env_parse::<u32>("TASK_CONVERTER_MAX_TOKENS") {
        cfg.max_tokens = max_tokens;
    }
    if let Some(temperature) = env_parse::<f64>("TASK_CONVERTER_TEMPERATURE") {
        cfg.temperature = temperature;
    }
    if let Some(limit) = env_parse::<usize>("TASK_CONVERTER_HISTORY_LIMIT") {
        cfg.history_limit = limit;
    }
    cfg.store_path = env_opt("TASK_CONVERTER_STORE");
    if let Some(raw) = env_opt("TASK_CONVERTER_TARGET_HOSTS") {
        let hosts: Vec<String> = raw
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if !hosts.is_empty() {
            cfg.target_hosts = hosts;
        }
    }
    if let Some(ms) = env_parse::<u64>("TASK_CONVERTER_READY_DELAY_MS") {
        cfg.ready_delay = Duration::from_millis(ms);
    }
    cfg
}

pub fn build_store(cfg: &ConverterConfig) -> Result<Arc<dyn KeyValueStore>, ConverterError> {
    match &cfg.store_path {
        Some(path) => {
            info!(path = %path, "using file store");
            Ok(Arc::new(FileStore::open(path)?))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Wires the OpenAI adapter and the configured store together. A key in
/// `OPENAI_API_KEY` seeds the store when none is saved yet.
pub fn build_converter(cfg: ConverterConfig) -> Result<Converter, ConverterError> {
    let provider = OpenAIAdapter::new(OpenAIConfig {
        api_url: cfg.api_url.clone(),
        ..OpenAIConfig::default()
    })?;
    let store = build_store(&cfg)?;
    let converter = Converter::new(cfg, Arc::new(provider), store);
    if converter.credential()?.is_none() {
        if let Some(key) = env_opt("OPENAI_API_KEY") {
            converter.save_credential(&key)?;
        }
    }
    Ok(converter)
}
