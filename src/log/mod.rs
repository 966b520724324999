pub mod console_writer;
pub mod global;
pub mod json_log_sink;
pub mod log_entry;
pub mod log_level;
pub mod log_macros;
pub mod log_sink;
pub mod logger;
pub mod memory_writer;
pub mod noop_log_sink;
pub use console_writer::ConsoleWriter;
pub use json_log_sink::{Destination, JsonLogSink};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use log_sink::LogSink;
pub use logger::{ExitHook, Logger};
pub use memory_writer::MemoryWriter;
pub use noop_log_sink::NoopLogSink;
