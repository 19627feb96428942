use addpostbuild::cli::{handle_run, CliArgs};
use addpostbuild::util::logging::{self, parse_level};
use addpostbuild::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("addpostbuild v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = handle_run();
    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
