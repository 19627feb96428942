//! addpostbuild - adds a PostBuild target to MSBuild project files
//!
//! The tool walks a directory tree for `*.csproj` files and, for each
//! SDK-style project that does not have one yet, appends
//!
//! ```xml
//! <Target Name="PostBuild" AfterTargets="PostBuildEvent">
//!   <Exec Command="" />
//! </Target>
//! ```
//!
//! to the project root, adding a `<BinDir>c:\bin</BinDir>` property to the
//! first `PropertyGroup` if it has none. Files that are not SDK-style projects
//! are reported and left alone.
//!
//! # Example Usage
//!
//! ```no_run
//! use addpostbuild::{PatcherConfig, RealFileSystem, Runner};
//! use std::path::Path;
//!
//! let fs = RealFileSystem::new();
//! let mut out = std::io::stdout();
//! let reports = Runner::new(&fs, PatcherConfig::default()).run(Path::new("."), &mut out)?;
//! println!("{} project(s) checked", reports.len());
//! # Ok::<(), addpostbuild::RunError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`locator`]: stack-based search for project files
//! - [`project`]: XML model and the PostBuild patch
//! - [`runner`]: one run over a directory, with the file-count guard
//! - [`fs`]: file system abstraction with an in-memory mock

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod locator;
pub mod project;
pub mod runner;
pub mod util;

pub use config::{ConfigError, PatcherConfig};
pub use error::RunError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use locator::{FileLocator, LocateError};
pub use project::{add_post_build, Outcome, PatchError, ProjectDocument, ProjectPatcher};
pub use runner::{FileReport, Runner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
