//! MSBuild project files: in-memory model and the PostBuild patch

pub mod document;
pub mod patcher;

pub use document::{Element, ProjectDocument};
pub use patcher::{add_post_build, Outcome, PatchError, ProjectPatcher};
