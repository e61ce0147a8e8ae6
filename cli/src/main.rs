mod commands;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use commands::{CommandLine, Commands, check};
use safenet_common::config::{Config, DEFAULT_CONFIG_FILE};
use safenet_common::error::ConfigError;
use terminal::{logging, print};
use tracing::{error, warn};

const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose, commands.quiet);

    match run(commands).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(commands: CommandLine) -> anyhow::Result<u8> {
    let cfg = load_config(commands.config)?;

    match commands.command {
        Commands::Check => {
            print::header("performing safety checks", commands.quiet);
            let outcome = check::check(&cfg, commands.quiet).await?;
            Ok(outcome.exit_code())
        }
    }
}

/// An explicit path must exist; the default file may be absent.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::from_file(&path).with_context(|| format!("loading {}", path.display()));
    }

    match Config::from_file(DEFAULT_CONFIG_FILE) {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::NotFound { .. }) => {
            warn!("Config file not found; using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context(format!("loading {DEFAULT_CONFIG_FILE}")),
    }
}
