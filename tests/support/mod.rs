use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the built binary
pub fn addpostbuild_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_addpostbuild"))
}

/// Contents of a file under tests/fixtures/projects
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/projects")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Copies fixture `name` to `dir/rel_path`, creating parent directories
pub fn place_fixture(dir: &Path, rel_path: &str, name: &str) -> PathBuf {
    let target = dir.join(rel_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&target, fixture(name)).expect("Failed to write fixture");
    target
}

/// Runs the binary with `dir` as working directory and a clean logging setup
pub fn run_in(dir: &Path, envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(addpostbuild_bin());
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("ADDPOSTBUILD_LOG_LEVEL")
        .env_remove("ADDPOSTBUILD_MAX_FILES");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute addpostbuild")
}

#[allow(dead_code)]
pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
