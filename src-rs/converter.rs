use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tracing::{info, warn};

use crate::channel::{is_target_page, FillCommand, PageChannel};
use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::llm::{CompletionRequest, Message, ProviderAdapter};
use crate::storage::{KeyValueStore, CREDENTIAL_KEY};
use crate::task::{
    build_prompt, normalize_response, parse_task, ConversionRecord, GeneratedTask, HistoryStore,
    SYSTEM_PROMPT,
};

pub struct Converter {
    pub config: ConverterConfig,
    provider: Arc<dyn ProviderAdapter>,
    store: Arc<dyn KeyValueStore>,
    history: HistoryStore,
}

impl Converter {
    pub fn new(config: ConverterConfig, provider: Arc<dyn ProviderAdapter>, store: Arc<dyn KeyValueStore>) -> Self {
        let history = HistoryStore::new(store.clone(), config.history_limit);
        Self {
            config,
            provider,
            store,
            history,
        }
    }

    pub fn save_credential(&self, key: &str) -> Result<(), ConverterError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConverterError::invalid("credential", "Please enter a valid API key"));
        }
        self.store.set_one(CREDENTIAL_KEY, Value::String(key.to_string()))?;
        info!("credential saved");
        Ok(())
    }

    pub fn remove_credential(&self) -> Result<(), ConverterError> {
        self.store.remove(&[CREDENTIAL_KEY])?;
        info!("credential removed");
        Ok(())
    }

    pub fn credential(&self) -> Result<Option<String>, ConverterError> {
        Ok(self
            .store
            .get_one(CREDENTIAL_KEY)?
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|key| !key.trim().is_empty()))
    }

    /// Converts with the stored credential.
    pub fn convert_stored(&self, task_text: &str) -> Result<GeneratedTask, ConverterError> {
        let credential = self.credential()?.unwrap_or_default();
        self.convert(task_text, &credential)
    }

    pub fn convert(&self, task_text: &str, credential: &str) -> Result<GeneratedTask, ConverterError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ConverterError::invalid(
                "credential",
                "Please enter your OpenAI API key first",
            ));
        }
        let task_text = task_text.trim();
        if task_text.is_empty() {
            return Err(ConverterError::invalid(
                "task",
                "Please describe what you want to accomplish",
            ));
        }

        let request = CompletionRequest {
            api_key: credential.to_string(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(&build_prompt(task_text))],
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let response = self.provider.complete(request).map_err(|err| {
            warn!(error = %err, "completion failed");
            ConverterError::from(err)
        })?;

        let normalized = normalize_response(&response.content)
            .ok_or_else(|| ConverterError::ServiceError("API Error: empty completion".to_string()))?;
        let task = parse_task(&normalized);

        let record = ConversionRecord::new(task_text, task.clone());
        self.history.record(record.clone())?;
        self.history.set_current(&record)?;
        info!(title = %task.title, "task generated");
        Ok(task)
    }

    pub fn history(&self) -> Result<Vec<ConversionRecord>, ConverterError> {
        Ok(self.history.list()?)
    }

    pub fn clear_history(&self) -> Result<(), ConverterError> {
        Ok(self.history.clear()?)
    }

    pub fn select_history(&self, index: usize) -> Result<Option<ConversionRecord>, ConverterError> {
        Ok(self.history.select(index)?)
    }

    pub fn current_result(&self) -> Result<Option<ConversionRecord>, ConverterError> {
        Ok(self.history.current()?)
    }

    pub fn dismiss_result(&self) -> Result<(), ConverterError> {
        Ok(self.history.clear_current()?)
    }

    /// Raw text of one section of the current result, for copying.
    pub fn copy_section(&self, section: &str) -> Result<String, ConverterError> {
        let record = self
            .current_result()?
            .ok_or_else(|| ConverterError::invalid("result", "No task to copy"))?;
        record
            .generated_task
            .section(section)
            .map(str::to_string)
            .ok_or_else(|| ConverterError::invalid("section", "Unknown section"))
    }

    /// Sends the current result to the page behind `channel`. Returns the
    /// confirmation shown to the user.
    pub fn fill_page(&self, tab_url: &str, channel: &mut dyn PageChannel) -> Result<String, ConverterError> {
        let command = self.prepare_fill(tab_url)?;
        if !self.config.ready_delay.is_zero() {
            thread::sleep(self.config.ready_delay);
        }
        deliver_fill(tab_url, &command, channel)
    }

    /// Checks the fill preconditions and builds the command for the current
    /// result. Nothing is sent.
    pub fn prepare_fill(&self, tab_url: &str) -> Result<FillCommand, ConverterError> {
        let record = self
            .current_result()?
            .ok_or_else(|| ConverterError::invalid("result", "No task to fill"))?;
        if !is_target_page(tab_url, &self.config.target_hosts) {
            return Err(ConverterError::NotTargetPage(tab_url.to_string()));
        }
        Ok(FillCommand::fill(record.generated_task.to_fill_request()))
    }
}

/// Sends a prepared command once and maps the page's reply.
pub fn deliver_fill(
    tab_url: &str,
    command: &FillCommand,
    channel: &mut dyn PageChannel,
) -> Result<String, ConverterError> {
    match channel.send(command) {
        None => {
            warn!(url = %tab_url, "page did not answer");
            Err(ConverterError::ChannelUnavailable)
        }
        Some(reply) if reply.success => {
            info!(url = %tab_url, message = %reply.message, "page filled");
            Ok("Task filled in Jira form!".to_string())
        }
        Some(reply) => {
            warn!(url = %tab_url, message = %reply.message, "page fill found nothing");
            Err(ConverterError::TargetNotFound)
        }
    }
}
