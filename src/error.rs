use crate::config::ConfigError;
use crate::locator::LocateError;
use crate::project::PatchError;
use std::io;
use thiserror::Error;

/// Exit status used when the file-count guard trips
pub const TOO_MANY_FILES_EXIT_CODE: i32 = -1;
/// Exit status for every other fatal error
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Errors that end a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Too many csproj files to process: the limit is {}.", number_in_words(.limit))]
    TooManyFiles { found: usize, limit: usize },

    #[error("Failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("Failed to write report: {0}")]
    Report(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::TooManyFiles { .. } => TOO_MANY_FILES_EXIT_CODE,
            _ => FAILURE_EXIT_CODE,
        }
    }

    /// The file-count guard reports its own message; everything else is
    /// prefixed with the program name.
    pub fn is_guard(&self) -> bool {
        matches!(self, RunError::TooManyFiles { .. })
    }
}

fn number_in_words(n: &usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(*n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}
