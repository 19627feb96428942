use glob::Pattern;
use std::env;
use thiserror::Error;

pub const DEFAULT_FILE_PATTERN: &str = "*.csproj";
pub const DEFAULT_MAX_FILES: usize = 3;
pub const DEFAULT_BIN_DIR: &str = r"c:\bin";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub const MAX_FILES_ENV: &str = "ADDPOSTBUILD_MAX_FILES";
pub const LOG_LEVEL_ENV: &str = "ADDPOSTBUILD_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "ADDPOSTBUILD_LOG_JSON";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Invalid file pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

/// Policy knobs for a patching run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatcherConfig {
    /// Glob matched against file names, never against directories
    pub file_pattern: String,
    /// Runs that find more files than this are aborted untouched
    pub max_files: usize,
    /// Text of the `BinDir` property added when a project lacks one
    pub bin_dir: String,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            max_files: DEFAULT_MAX_FILES,
            bin_dir: DEFAULT_BIN_DIR.to_string(),
        }
    }
}

impl PatcherConfig {
    /// Defaults overridden by `ADDPOSTBUILD_MAX_FILES` when it is set
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(MAX_FILES_ENV) {
            config.max_files = raw.trim().parse::<usize>().map_err(|e| ConfigError::ParseError {
                field: MAX_FILES_ENV.to_string(),
                error: e.to_string(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pattern().map(|_| ())
    }

    pub fn pattern(&self) -> Result<Pattern, ConfigError> {
        Pattern::new(&self.file_pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: self.file_pattern.clone(),
            error: e.to_string(),
        })
    }
}
