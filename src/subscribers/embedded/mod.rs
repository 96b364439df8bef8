//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders watchdog events through `tracing`.

mod log;

pub use log::LogWriter;
