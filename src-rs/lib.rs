pub mod channel;
pub mod config;
pub mod converter;
pub mod error;
pub mod helpers;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "task/lib.rs"]
pub mod task;
#[path = "storage/lib.rs"]
pub mod storage;
#[path = "injector/lib.rs"]
pub mod injector;
#[path = "api/lib.rs"]
pub mod api;

pub use channel::{FillCommand, FillReply, InjectorChannel, PageChannel};
pub use config::ConverterConfig;
pub use converter::Converter;
pub use error::ConverterError;
