//! Process-level infrastructure.

pub mod logging;

pub use logging::{init_logging, targets, LogConfig, LogFormat};
