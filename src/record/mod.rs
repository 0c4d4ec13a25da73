pub mod factory;
pub mod synthetic;
pub mod types;

pub use factory::RecordFactory;
pub use synthetic::SyntheticFactory;
pub use types::{GenerationError, LogLevel, LogRecord, TIMESTAMP_FORMAT, TraceContext};
