use axum::Server;
use chrono::{Duration, FixedOffset};
use clap::{builder::NonEmptyStringValueParser, Parser};
use dispatch::{Composer, Dispatcher, TracingTelemetry};
use eyre::WrapErr;
use std::{net::SocketAddr, sync::Arc};
use teamevents::{ApiSecret, Continuation, LogSnag, Mailer};
use tokio::signal;
use tracing::{info, Level};
use url::Url;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    common::dotenv()?;

    let config = Config::parse();
    common::logging::init(config.log_level)?;

    let db = database::connect(&config.database_url).await?;

    let mut dispatcher = Dispatcher::new(
        Arc::new(db),
        Arc::new(Mailer::new(config.mailer_url, &config.mailer_api_key)),
        Arc::new(Continuation::new(config.continuation_url, &config.api_secret)),
        config.mail_from,
    )
    .budget(Duration::seconds(config.time_budget))
    .composer(Composer::new(config.display_offset));

    dispatcher = match (&config.logsnag_token, &config.logsnag_project) {
        (Some(token), Some(project)) => {
            info!(%project, "publishing telemetry to logsnag");
            dispatcher.telemetry(Arc::new(LogSnag::new(
                token,
                project,
                &config.logsnag_channel,
            )))
        }
        _ => dispatcher.telemetry(Arc::new(TracingTelemetry)),
    };

    let router = teamevents::router(dispatcher, ApiSecret::new(&config.api_secret));

    info!(address = %config.address, "listening and ready to handle requests");
    Server::bind(&config.address)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown())
        .await
        .wrap_err("failed to start server")?;

    Ok(())
}

/// Setup hyper graceful shutdown for SIGINT (ctrl+c) and SIGTERM
async fn shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+c handler")
    };
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("server successfully shutdown");
    info!("goodbye! o/");
}

/// Sends daily event reminders to every member of every team
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Config {
    /// The address for the server to listen on
    #[arg(long, default_value = "127.0.0.1:4321", env = "ADDRESS")]
    address: SocketAddr,

    /// The database holding organizations, members, and events
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// The default level to log at
    #[arg(long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,

    /// The secret callers must present to trigger a run
    ///
    /// Also presented to the continuation webhook when handing off an interrupted run.
    #[arg(
        long,
        env = "API_SECRET",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new(),
    )]
    api_secret: String,

    /// The endpoint emails are sent through
    #[arg(long, env = "MAILER_URL")]
    mailer_url: Url,

    /// The key to authenticate with the mailer
    #[arg(long, env = "MAILER_API_KEY", hide_env_values = true)]
    mailer_api_key: String,

    /// The address reminders are sent from
    #[arg(long, env = "MAIL_FROM")]
    mail_from: String,

    /// The webhook that schedules a follow-up run when one is interrupted
    #[arg(long, env = "CONTINUATION_URL")]
    continuation_url: Url,

    /// How many seconds a single run may spend sending reminders
    #[arg(
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(i64).range(1..),
        env = "TIME_BUDGET",
    )]
    time_budget: i64,

    /// The UTC offset dates and times are displayed in, i.e. `+02:00`
    #[arg(
        long,
        default_value = "+00:00",
        value_parser = offset_parser,
        env = "DISPLAY_OFFSET",
    )]
    display_offset: FixedOffset,

    /// The LogSnag API token to publish telemetry with
    #[arg(long, env = "LOGSNAG_TOKEN", hide_env_values = true)]
    logsnag_token: Option<String>,

    /// The LogSnag project to publish telemetry to
    #[arg(long, env = "LOGSNAG_PROJECT")]
    logsnag_project: Option<String>,

    /// The LogSnag channel to publish telemetry to
    #[arg(long, default_value = "reminders", env = "LOGSNAG_CHANNEL")]
    logsnag_channel: String,
}

fn offset_parser(raw: &str) -> Result<FixedOffset, String> {
    raw.parse::<FixedOffset>()
        .map_err(|_| format!("invalid UTC offset {raw:?}, expected something like +02:00"))
}
