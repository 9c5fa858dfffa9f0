//! Utility functions for error handling
//!
//! Helpers that attach file and column context to failures.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;

use crate::error::Result;

/// Open a file, explaining in the error what it was needed for
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        anyhow::bail!("File not found: {} (needed for: {purpose})", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {} (expected a file for: {purpose})", path.display());
    }

    fs::File::open(path).map_err(|e| {
        let reason = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied",
            io::ErrorKind::NotFound => "file disappeared during operation",
            _ => "failed to open file",
        };
        anyhow::Error::new(e).context(format!("{reason}: {} (for: {purpose})", path.display()))
    })
}

/// Read a file to a string with the same error context as [`safe_open_file`]
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;
    let mut content = String::new();
    io::Read::read_to_string(&mut file, &mut content)
        .with_context(|| format!("Failed to read {} for: {purpose}", path.display()))?;
    Ok(content)
}

/// Extension trait adding column context to fallible Arrow operations
pub trait ResultExt<T> {
    /// Add context about the column being processed
    fn with_column_context(self, column_name: &str) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_column_context(self, column_name: &str) -> Result<T> {
        self.with_context(|| format!("Error processing column '{column_name}'"))
    }
}
