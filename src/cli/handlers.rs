use super::output::{format_error, program_name};
use crate::config::PatcherConfig;
use crate::error::RunError;
use crate::fs::RealFileSystem;
use crate::runner::Runner;
use std::env;
use tracing::debug;

/// Runs against the current directory and returns the process exit code
pub fn handle_run() -> i32 {
    match run_in_current_dir() {
        Ok(()) => 0,
        Err(e) => {
            debug!(error = ?e, "Run aborted");
            eprintln!("{}", format_error(&program_name(), &e));
            e.exit_code()
        }
    }
}

fn run_in_current_dir() -> Result<(), RunError> {
    let config = PatcherConfig::from_env()?;
    let start = env::current_dir().map_err(RunError::CurrentDir)?;
    debug!(start = %start.display(), ?config, "Starting run");

    let fs = RealFileSystem::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    Runner::new(&fs, config).run(&start, &mut out)?;
    Ok(())
}
