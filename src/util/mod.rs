//! Utility modules

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
