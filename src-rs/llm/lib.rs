pub mod openai_adapter;
pub mod types;

pub use openai_adapter::{OpenAIAdapter, OpenAIConfig, DEFAULT_API_URL};
pub use types::{CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError};
