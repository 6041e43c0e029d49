use std::time::Duration;

use crate::llm::DEFAULT_API_URL;
use crate::task::DEFAULT_HISTORY_LIMIT;

#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub history_limit: usize,
    pub store_path: Option<String>,
    pub target_hosts: Vec<String>,
    /// How long to give a freshly injected page script before sending it
    /// the fill command.
    pub ready_delay: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 800,
            temperature: 0.7,
            history_limit: DEFAULT_HISTORY_LIMIT,
            store_path: None,
            target_hosts: vec!["atlassian.net".to_string(), "jira.com".to_string()],
            ready_delay: Duration::from_millis(1000),
        }
    }
}
