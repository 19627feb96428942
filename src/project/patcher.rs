//! Adds a `PostBuild` target to SDK-style project files

use super::document::{Element, ProjectDocument};
use crate::fs::FileSystem;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const POST_BUILD_TARGET: &str = "PostBuild";
pub const POST_BUILD_EVENT: &str = "PostBuildEvent";

/// What happened to one project file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target was added and the file rewritten
    Success,
    AlreadyHasPostBuild,
    NoProjectRoot,
    NoSdkAttribute,
    NoPropertyGroup,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// The line reported for `path`
    pub fn message(&self, path: &Path) -> String {
        let path = path.display();
        match self {
            Outcome::Success => format!("Updated file {} to have a postbuild step", path),
            Outcome::AlreadyHasPostBuild => format!("File {} already has a postbuild step", path),
            Outcome::NoProjectRoot => {
                format!("File {} does not have <Project> as the root element", path)
            }
            Outcome::NoSdkAttribute => format!(
                "File {} has a <Project> root node but does not have an Sdk Attribute in the root node",
                path
            ),
            Outcome::NoPropertyGroup => format!(
                "File {} has a <Project> root node and Sdk attribute but does not have any PropertyGroup nodes",
                path
            ),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Success => "success",
            Outcome::AlreadyHasPostBuild => "already-has-postbuild",
            Outcome::NoProjectRoot => "no-project-root",
            Outcome::NoSdkAttribute => "no-sdk-attribute",
            Outcome::NoPropertyGroup => "no-property-group",
        };
        f.write_str(name)
    }
}

/// Failures that stop the whole run rather than describing one file
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("{source:#}")]
    Read { path: PathBuf, source: anyhow::Error },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: roxmltree::Error,
    },
    #[error("{source:#}")]
    Write { path: PathBuf, source: anyhow::Error },
}

pub struct ProjectPatcher<'a> {
    fs: &'a dyn FileSystem,
    bin_dir: String,
}

impl<'a> ProjectPatcher<'a> {
    pub fn new(fs: &'a dyn FileSystem, bin_dir: impl Into<String>) -> Self {
        Self {
            fs,
            bin_dir: bin_dir.into(),
        }
    }

    /// Loads, checks and, when every check passes, rewrites `path`.
    ///
    /// The file is written only for [`Outcome::Success`].
    pub fn patch(&self, path: &Path) -> Result<Outcome, PatchError> {
        let text = self.fs.read_to_string(path).map_err(|source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut doc = ProjectDocument::parse(&text).map_err(|source| PatchError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let outcome = add_post_build(&mut doc, &self.bin_dir);
        debug!(path = %path.display(), %outcome, "Checked project file");

        if outcome.is_success() {
            self.fs
                .write(path, &doc.to_xml_string())
                .map_err(|source| PatchError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!(path = %path.display(), "Wrote PostBuild target");
        }

        Ok(outcome)
    }
}

/// Validates `doc` and, if valid, adds the `PostBuild` target in place.
///
/// Checks run in a fixed order and the first failure wins. `doc` is left
/// untouched unless the result is [`Outcome::Success`].
pub fn add_post_build(doc: &mut ProjectDocument, bin_dir: &str) -> Outcome {
    let root = doc.root();

    if root.local_name() != "Project" {
        return Outcome::NoProjectRoot;
    }

    if !root.has_attribute("Sdk") {
        return Outcome::NoSdkAttribute;
    }

    if doc.descendants().any(is_post_build_target) {
        return Outcome::AlreadyHasPostBuild;
    }

    let Some(property_group) = doc.root_mut().find_mut(|e| e.is("PropertyGroup")) else {
        return Outcome::NoPropertyGroup;
    };

    if property_group.child("BinDir").is_none() {
        property_group.append_child(Element::new("BinDir").with_text(bin_dir));
    }

    // Command stays empty: the target is a placeholder for the user to fill in
    doc.root_mut().append_child(
        Element::new("Target")
            .with_attribute("Name", POST_BUILD_TARGET)
            .with_attribute("AfterTargets", POST_BUILD_EVENT)
            .with_child(Element::new("Exec").with_attribute("Command", "")),
    );

    Outcome::Success
}

fn is_post_build_target(element: &Element) -> bool {
    element.is("Target")
        && element.attribute("Name") == Some(POST_BUILD_TARGET)
        && element.attribute("AfterTargets") == Some(POST_BUILD_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use yare::parameterized;

    const BIN_DIR: &str = r"c:\bin";

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>"#;

    fn outcome_of(xml: &str) -> (Outcome, ProjectDocument) {
        let mut doc = ProjectDocument::parse(xml).unwrap();
        let outcome = add_post_build(&mut doc, BIN_DIR);
        (outcome, doc)
    }

    fn post_build_targets(doc: &ProjectDocument) -> Vec<&Element> {
        doc.descendants().filter(|e| is_post_build_target(e)).collect()
    }

    #[test]
    fn test_adds_target_and_bin_dir() {
        let (outcome, doc) = outcome_of(SDK_PROJECT);

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            doc.to_xml_string(),
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
    <BinDir>c:\bin</BinDir>
  </PropertyGroup>
  <Target Name="PostBuild" AfterTargets="PostBuildEvent">
    <Exec Command="" />
  </Target>
</Project>"#
        );
    }

    #[test]
    fn test_added_target_has_single_empty_exec() {
        let (_, doc) = outcome_of(SDK_PROJECT);

        let targets = post_build_targets(&doc);
        assert_eq!(targets.len(), 1);
        let execs: Vec<&Element> = targets[0].children().collect();
        assert_eq!(execs.len(), 1);
        assert!(execs[0].is("Exec"));
        assert_eq!(execs[0].attribute("Command"), Some(""));
    }

    #[test]
    fn test_existing_bin_dir_is_kept() {
        let (outcome, doc) = outcome_of(
            r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><BinDir>d:\custom</BinDir></PropertyGroup></Project>"#,
        );

        assert_eq!(outcome, Outcome::Success);
        let group = doc.root().child("PropertyGroup").unwrap();
        let bin_dirs: Vec<&Element> = group.children().filter(|e| e.is("BinDir")).collect();
        assert_eq!(bin_dirs.len(), 1);
        assert_eq!(bin_dirs[0].text(), r"d:\custom");
    }

    #[test]
    fn test_only_first_property_group_gets_bin_dir() {
        let (outcome, doc) = outcome_of(
            r#"<Project Sdk="x"><PropertyGroup Label="a" /><PropertyGroup Label="b" /></Project>"#,
        );

        assert_eq!(outcome, Outcome::Success);
        let groups: Vec<&Element> = doc.root().children().filter(|e| e.is("PropertyGroup")).collect();
        assert_eq!(groups[0].child("BinDir").unwrap().text(), BIN_DIR);
        assert!(groups[1].child("BinDir").is_none());
    }

    #[test]
    fn test_nested_property_group_is_found() {
        let (outcome, doc) = outcome_of(
            r#"<Project Sdk="x"><Choose><When Condition="true"><PropertyGroup /></When></Choose></Project>"#,
        );

        assert_eq!(outcome, Outcome::Success);
        let group = doc
            .descendants()
            .find(|e| e.is("PropertyGroup"))
            .unwrap();
        assert!(group.child("BinDir").is_some());
    }

    #[test]
    fn test_bin_dir_deeper_than_direct_child_does_not_count() {
        let (_, doc) = outcome_of(
            r#"<Project Sdk="x"><PropertyGroup><Inner><BinDir>x</BinDir></Inner></PropertyGroup></Project>"#,
        );

        let group = doc.root().child("PropertyGroup").unwrap();
        assert_eq!(group.child("BinDir").unwrap().text(), BIN_DIR);
    }

    #[parameterized(
        wrong_root = { r#"<Solution Sdk="x"><PropertyGroup /></Solution>"#, Outcome::NoProjectRoot },
        lowercase_root = { r#"<project Sdk="x"><PropertyGroup /></project>"#, Outcome::NoProjectRoot },
        missing_sdk = { r#"<Project><PropertyGroup /></Project>"#, Outcome::NoSdkAttribute },
        sdk_wrong_case = { r#"<Project sdk="x"><PropertyGroup /></Project>"#, Outcome::NoSdkAttribute },
        no_property_group = { r#"<Project Sdk="x"><ItemGroup /></Project>"#, Outcome::NoPropertyGroup },
        already_patched = {
            r#"<Project Sdk="x"><PropertyGroup /><Target Name="PostBuild" AfterTargets="PostBuildEvent" /></Project>"#,
            Outcome::AlreadyHasPostBuild
        },
        already_patched_without_property_group = {
            r#"<Project Sdk="x"><Target Name="PostBuild" AfterTargets="PostBuildEvent" /></Project>"#,
            Outcome::AlreadyHasPostBuild
        },
        nested_existing_target = {
            r#"<Project Sdk="x"><PropertyGroup /><ImportGroup><Target Name="PostBuild" AfterTargets="PostBuildEvent" /></ImportGroup></Project>"#,
            Outcome::AlreadyHasPostBuild
        },
    )]
    fn test_validation_outcomes(xml: &str, expected: Outcome) {
        let original = ProjectDocument::parse(xml).unwrap();
        let (outcome, doc) = outcome_of(xml);

        assert_eq!(outcome, expected);
        assert_eq!(doc, original);
    }

    #[test]
    fn test_empty_sdk_attribute_is_enough() {
        let (outcome, _) = outcome_of(r#"<Project Sdk=""><PropertyGroup /></Project>"#);
        assert_eq!(outcome, Outcome::Success);
    }

    #[test]
    fn test_namespaced_project_root_passes_root_check() {
        let (outcome, _) =
            outcome_of(r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003" />"#);
        assert_eq!(outcome, Outcome::NoSdkAttribute);
    }

    #[parameterized(
        other_name = { r#"<Target Name="Build" AfterTargets="PostBuildEvent" />"# },
        other_event = { r#"<Target Name="PostBuild" AfterTargets="Build" />"# },
        missing_after_targets = { r#"<Target Name="PostBuild" />"# },
        missing_name = { r#"<Target AfterTargets="PostBuildEvent" />"# },
        case_differs = { r#"<Target Name="postbuild" AfterTargets="PostBuildEvent" />"# },
    )]
    fn test_near_miss_targets_do_not_count(target: &str) {
        let xml = format!(r#"<Project Sdk="x"><PropertyGroup />{}</Project>"#, target);
        let (outcome, doc) = outcome_of(&xml);

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(post_build_targets(&doc).len(), 1);
    }

    #[test]
    fn test_patch_writes_once_and_is_idempotent() {
        let fs = MockFileSystem::new();
        fs.add_file("App.csproj", SDK_PROJECT);
        let patcher = ProjectPatcher::new(&fs, BIN_DIR);
        let path = Path::new("/mock/App.csproj");

        assert_eq!(patcher.patch(path).unwrap(), Outcome::Success);
        let after_first = fs.read_to_string(path).unwrap();

        assert_eq!(patcher.patch(path).unwrap(), Outcome::AlreadyHasPostBuild);
        assert_eq!(fs.read_to_string(path).unwrap(), after_first);
        assert_eq!(fs.writes().len(), 1);
    }

    #[parameterized(
        no_project_root = { "<Solution />" },
        no_sdk = { "<Project>\n\t<PropertyGroup/>\n</Project>\n" },
        no_property_group = { "<?xml version=\"1.0\"?>\r\n<Project Sdk=\"x\">\r\n</Project>" },
    )]
    fn test_patch_leaves_invalid_files_byte_identical(xml: &str) {
        let fs = MockFileSystem::new();
        fs.add_file("App.csproj", xml);
        let patcher = ProjectPatcher::new(&fs, BIN_DIR);

        let outcome = patcher.patch(Path::new("/mock/App.csproj")).unwrap();

        assert!(!outcome.is_success());
        assert_eq!(fs.read_to_string(Path::new("/mock/App.csproj")).unwrap(), xml);
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn test_patch_reports_parse_errors() {
        let fs = MockFileSystem::new();
        fs.add_file("Broken.csproj", "<Project Sdk=\"x\">");
        let patcher = ProjectPatcher::new(&fs, BIN_DIR);

        let err = patcher.patch(Path::new("/mock/Broken.csproj")).unwrap_err();

        assert!(matches!(
            &err,
            PatchError::Parse { path, .. } if path == Path::new("/mock/Broken.csproj")
        ));
        assert!(err.to_string().contains("Broken.csproj"));
    }

    #[test]
    fn test_patch_reports_missing_file() {
        let fs = MockFileSystem::new();
        let patcher = ProjectPatcher::new(&fs, BIN_DIR);

        let err = patcher.patch(Path::new("/mock/Gone.csproj")).unwrap_err();
        assert!(matches!(err, PatchError::Read { .. }));
    }

    #[test]
    fn test_patch_reports_write_failure() {
        let fs = MockFileSystem::new();
        fs.add_file("App.csproj", SDK_PROJECT);
        fs.set_read_only("App.csproj");
        let patcher = ProjectPatcher::new(&fs, BIN_DIR);

        let err = patcher.patch(Path::new("/mock/App.csproj")).unwrap_err();

        assert!(matches!(err, PatchError::Write { .. }));
        assert_eq!(
            fs.read_to_string(Path::new("/mock/App.csproj")).unwrap(),
            SDK_PROJECT
        );
    }

    #[test]
    fn test_custom_bin_dir() {
        let mut doc = ProjectDocument::parse(SDK_PROJECT).unwrap();
        add_post_build(&mut doc, "/opt/bin");

        let group = doc.root().child("PropertyGroup").unwrap();
        assert_eq!(group.child("BinDir").unwrap().text(), "/opt/bin");
    }

    #[parameterized(
        success = { Outcome::Success, "Updated file a/App.csproj to have a postbuild step" },
        already = { Outcome::AlreadyHasPostBuild, "File a/App.csproj already has a postbuild step" },
        no_root = { Outcome::NoProjectRoot, "File a/App.csproj does not have <Project> as the root element" },
        no_sdk = {
            Outcome::NoSdkAttribute,
            "File a/App.csproj has a <Project> root node but does not have an Sdk Attribute in the root node"
        },
        no_group = {
            Outcome::NoPropertyGroup,
            "File a/App.csproj has a <Project> root node and Sdk attribute but does not have any PropertyGroup nodes"
        },
    )]
    fn test_messages(outcome: Outcome, expected: &str) {
        assert_eq!(outcome.message(Path::new("a/App.csproj")), expected);
    }
}
