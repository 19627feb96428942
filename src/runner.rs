//! One patching run: locate, guard, patch, report

use crate::config::PatcherConfig;
use crate::error::RunError;
use crate::fs::FileSystem;
use crate::locator::FileLocator;
use crate::project::{Outcome, ProjectPatcher};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result for one processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl FileReport {
    pub fn message(&self) -> String {
        self.outcome.message(&self.path)
    }
}

pub struct Runner<'a> {
    fs: &'a dyn FileSystem,
    config: PatcherConfig,
}

impl<'a> Runner<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: PatcherConfig) -> Self {
        Self { fs, config }
    }

    /// Patches every project file under `start`, writing one report line per
    /// file to `out` as soon as that file is done.
    ///
    /// Nothing is touched when more than `max_files` files match. The first
    /// fatal error stops the run; lines already written stay written.
    pub fn run(&self, start: &Path, out: &mut dyn Write) -> Result<Vec<FileReport>, RunError> {
        let pattern = self.config.pattern()?;
        let files = FileLocator::new(self.fs, pattern).find(start)?;
        debug!(
            start = %start.display(),
            pattern = %self.config.file_pattern,
            found = files.len(),
            "Located project files"
        );

        if files.len() > self.config.max_files {
            info!(
                found = files.len(),
                limit = self.config.max_files,
                "Refusing to patch, too many project files"
            );
            return Err(RunError::TooManyFiles {
                found: files.len(),
                limit: self.config.max_files,
            });
        }

        let patcher = ProjectPatcher::new(self.fs, self.config.bin_dir.as_str());
        let mut reports = Vec::with_capacity(files.len());

        for path in files {
            let outcome = patcher.patch(&path)?;
            let report = FileReport { path, outcome };
            writeln!(out, "{}", report.message()).map_err(RunError::Report)?;
            reports.push(report);
        }

        info!(
            processed = reports.len(),
            updated = reports.iter().filter(|r| r.outcome.is_success()).count(),
            "Run complete"
        );
        Ok(reports)
    }
}
