//! Logging utilities
//!
//! Standardized log lines for pipeline stages. Everything goes through the
//! `log` facade; the binary installs `env_logger`.

pub mod log;

pub use self::log::{log_operation_complete, log_operation_start, log_warning};
