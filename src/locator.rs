//! Iterative search for project files under a directory

use crate::fs::FileSystem;
use glob::Pattern;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Could not find a part of the path '{}'", .0.display())]
    PathNotFound(PathBuf),
    #[error("Path is not a directory: '{}'", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    FileSystem(#[from] anyhow::Error),
}

/// Walks a directory tree with an explicit stack, collecting files whose name
/// matches a glob pattern.
pub struct FileLocator<'a> {
    fs: &'a dyn FileSystem,
    pattern: Pattern,
}

impl<'a> FileLocator<'a> {
    pub fn new(fs: &'a dyn FileSystem, pattern: Pattern) -> Self {
        Self { fs, pattern }
    }

    /// Returns matching files in traversal order.
    ///
    /// Each popped directory contributes its own matching files first; its
    /// subdirectories are then pushed, so the last one pushed is walked next.
    /// Entries are sorted by name within a directory to keep the order stable
    /// across file systems.
    pub fn find(&self, start: &Path) -> Result<Vec<PathBuf>, LocateError> {
        if !self.fs.exists(start) {
            return Err(LocateError::PathNotFound(start.to_path_buf()));
        }
        if !self.fs.is_dir(start) {
            return Err(LocateError::NotADirectory(start.to_path_buf()));
        }

        let mut result = Vec::new();
        let mut stack = vec![start.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let mut entries = self.fs.read_dir(&dir)?;
            entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
            debug!(dir = %dir.display(), entries = entries.len(), "Scanning directory");

            for entry in entries.iter().filter(|e| e.is_file()) {
                if self.pattern.matches(entry.file_name()) {
                    debug!(path = %entry.path().display(), "Matched project file");
                    result.push(entry.path().to_path_buf());
                }
            }

            stack.extend(
                entries
                    .iter()
                    .filter(|e| e.is_dir())
                    .map(|e| e.path().to_path_buf()),
            );
        }

        Ok(result)
    }
}
