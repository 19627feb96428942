use clap::Parser;

/// Adds an empty PostBuild target to the SDK-style project files under the
/// current directory
#[derive(Parser, Debug)]
#[command(
    name = "addpostbuild",
    version,
    long_about = "Searches the current directory recursively for *.csproj files and adds a \
                  <Target Name=\"PostBuild\" AfterTargets=\"PostBuildEvent\"> with an empty \
                  <Exec Command=\"\" /> to each SDK-style project that lacks one.\n\n\
                  The run is refused when more than three project files are found \
                  (override with ADDPOSTBUILD_MAX_FILES)."
)]
pub struct CliArgs {
    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}
