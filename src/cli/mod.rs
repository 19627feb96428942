pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::CliArgs;
pub use handlers::handle_run;
