use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;

use crate::config::{DEFAULT_SECTION, default_config_path};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Everything the binary needs to know before loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: PathBuf,
    pub section: String,
    pub timeout: Duration,
    pub debug: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "review-requests",
    about = "List open pull requests awaiting your review, formatted for a status-bar menu"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// Configuration file [default: ~/.bitbarrc]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Section of the configuration file to read
    #[arg(long, default_value = DEFAULT_SECTION, value_name = "NAME")]
    pub section: String,

    /// Give up on the GitHub API after this many seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    pub timeout: u64,

    /// Log debug information to stderr
    #[arg(long)]
    pub debug: bool,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }
        if self.section.trim().is_empty() {
            anyhow::bail!("--section cannot be empty");
        }
        Ok(())
    }
}

fn create_invocation(cli: CliArgs) -> Result<Invocation> {
    cli.validate()?;

    Ok(Invocation {
        config_path: cli.config.unwrap_or_else(default_config_path),
        section: cli.section.trim().to_string(),
        timeout: Duration::from_secs(cli.timeout),
        debug: cli.debug,
    })
}

/// Parses command-line arguments into an [`Invocation`].
///
/// The status-bar host runs the plugin without arguments, so the defaults
/// alone must produce a working invocation. Help and version requests come
/// back as `clap::Error` for the caller to print.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    create_invocation(cli)
}
