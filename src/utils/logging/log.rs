//! Standard log lines for pipeline stages and file operations.

use std::time::Duration;

/// Announce the start of a stage
///
/// # Arguments
/// * `operation` - What is starting, e.g. "Reading CSV file"
/// * `subject` - The file or target it applies to
pub fn log_operation_start(operation: &str, subject: &str) {
    log::info!("{operation} {subject}");
}

/// Report a finished stage with its record count
///
/// # Arguments
/// * `operation` - Past-tense verb, e.g. "read" or "predicted"
/// * `subject` - The file or target it applied to
/// * `items` - Records processed
/// * `elapsed` - Wall time, when measured
pub fn log_operation_complete(
    operation: &str,
    subject: &str,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => {
            log::info!("Successfully {operation} {items} records for {subject} in {duration:?}");
        }
        None => log::info!("Successfully {operation} {items} records for {subject}"),
    }
}

/// Warn about a condition, naming the record it concerns if there is one
pub fn log_warning(message: &str, identifier: Option<&str>) {
    match identifier {
        Some(identifier) => log::warn!("{message}: record '{identifier}'"),
        None => log::warn!("{message}"),
    }
}
