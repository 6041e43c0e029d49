pub mod parser;
pub mod prompt;
pub mod store;
pub mod types;

pub use parser::{has_task_tag, normalize_response, parse_task, DEFAULT_TAG, TASK_TAGS};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use store::{current_task, HistoryStore, DEFAULT_HISTORY_LIMIT};
pub use types::{ConversionRecord, GeneratedTask};
