use clap::{Parser, Subcommand};
use tracing::{debug, Level};

mod seed;
mod trigger;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    common::dotenv()?;

    let args = Args::parse();
    common::logging::init(args.log_level)?;

    debug!(?args);

    match args.command {
        Command::Seed(args) => seed::run(args).await,
        Command::Trigger(args) => trigger::run(args).await,
    }
}

/// A collection of various development tasks
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// The default level to log at
    #[arg(short, long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill the database with a sample team, its members, and an upcoming event
    Seed(seed::Args),
    /// Trigger a reminder run by hand
    ///
    /// Useful for re-scheduling an interrupted run whose continuation could not be handed off.
    Trigger(trigger::Args),
}
