use eyre::WrapErr;
use sqlx::{migrate::Migrator, postgres::PgConnectOptions, ConnectOptions};
use std::str::FromStr;
use tracing::{info, log::LevelFilter};

mod event;
mod member;
mod organization;

pub use event::{Event, NewEvent};
pub use member::{Member, Role};
pub use organization::Organization;
pub use sqlx::{Error, PgPool};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Connect to the database
pub async fn connect(url: &str) -> eyre::Result<PgPool> {
    let options = PgConnectOptions::from_str(url)
        .wrap_err("invalid database URL format")?
        .log_statements(LevelFilter::Debug);
    let db = PgPool::connect_with(options)
        .await
        .wrap_err("failed to connect to the database")?;

    info!("connected to the database");

    Ok(db)
}

/// Apply any pending migrations
pub async fn migrate(db: &PgPool) -> eyre::Result<()> {
    MIGRATOR
        .run(db)
        .await
        .wrap_err("failed to apply migrations")?;

    info!("migrations applied");

    Ok(())
}
