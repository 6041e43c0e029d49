use thiserror::Error;

use crate::llm::ProviderError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    /// The generation service rejected the request or answered with
    /// something unusable. Carries the service's own message when it had one.
    #[error("{0}")]
    ServiceError(String),

    #[error("{0}")]
    NetworkError(String),

    #[error("no matching form fields on the page")]
    TargetNotFound,

    #[error("page did not answer the fill command")]
    ChannelUnavailable,

    #[error("not an issue tracker page: {0}")]
    NotTargetPage(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ConverterError {
    pub fn invalid(field: &'static str, message: &str) -> Self {
        ConverterError::InvalidInput {
            field,
            message: message.to_string(),
        }
    }

    /// Stable machine-readable code, as surfaced by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            ConverterError::InvalidInput { .. } => "invalid_input",
            ConverterError::ServiceError(_) => "service_error",
            ConverterError::NetworkError(_) => "network_error",
            ConverterError::TargetNotFound => "target_not_found",
            ConverterError::ChannelUnavailable => "channel_unavailable",
            ConverterError::NotTargetPage(_) => "not_target_page",
            ConverterError::Storage(_) => "storage_error",
        }
    }

    /// The one message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ConverterError::InvalidInput { message, .. } => message.clone(),
            ConverterError::ServiceError(_) => {
                "API Error: Please check your API key and try again.".to_string()
            }
            ConverterError::NetworkError(_) => {
                "Network Error: Please check your internet connection.".to_string()
            }
            ConverterError::TargetNotFound => {
                "Could not fill form. Please check if you are on a Jira create issue page.".to_string()
            }
            ConverterError::ChannelUnavailable => "Please refresh the Jira page and try again".to_string(),
            ConverterError::NotTargetPage(_) => "Please navigate to a Jira page first".to_string(),
            ConverterError::Storage(_) => "Could not read or save extension data.".to_string(),
        }
    }
}

impl From<ProviderError> for ConverterError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(_) => ConverterError::NetworkError(err.to_string()),
            ProviderError::Api { .. } | ProviderError::Malformed(_) => {
                ConverterError::ServiceError(err.to_string())
            }
        }
    }
}
