//! Error-stream formatting for fatal errors

use crate::error::RunError;
use std::env;
use std::path::Path;

/// File stem of the running executable, or the package name if unknown
pub fn program_name() -> String {
    env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// The line printed to stderr for a fatal error
pub fn format_error(program: &str, error: &RunError) -> String {
    if error.is_guard() {
        error.to_string()
    } else {
        format!("{} Error: {}", program, error)
    }
}
