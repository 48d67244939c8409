//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders hub events through `tracing`.

mod log;

pub use log::LogWriter;
