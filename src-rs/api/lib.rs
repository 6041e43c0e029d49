pub use crate::channel::{FillCommand, FillReply, InjectorChannel, PageChannel};
pub use crate::config::ConverterConfig;
pub use crate::converter::Converter;
pub use crate::error::ConverterError;
pub use crate::injector::{FillOutcome, FillRequest, Injector, MemoryDocument};
pub use crate::task::{ConversionRecord, GeneratedTask};

pub mod handlers;
pub mod server;
