use chrono::{Duration, Utc};
use database::{Event, Member, NewEvent, Organization, Role};
use eyre::WrapErr;
use tracing::info;

const TEAM: &str = "T0266FRGM";

pub async fn run(args: Args) -> eyre::Result<()> {
    let db = database::connect(&args.database_url).await?;
    let mut tx = db.begin().await.wrap_err("failed to start transaction")?;

    Organization::create(TEAM, "Hack Club", "", &mut *tx).await?;
    Member::create("U062UG485EE", TEAM, "Orpheus", "orpheus@example.com", Role::Admin, &mut *tx)
        .await?;
    Member::create("U04QD71QWS0", TEAM, "Heidi", "heidi@example.com", Role::User, &mut *tx)
        .await?;

    let event = Event::create(
        NewEvent {
            team: TEAM,
            name: "Hack Club Meeting",
            comments: "This is a test event",
            scheduled_at: Utc::now() + Duration::hours(args.in_hours),
            location: "Some location",
            going: &["U04QD71QWS0"],
            maybe: &[],
            not_going: &["U062UG485EE"],
        },
        &mut *tx,
    )
    .await?;

    tx.commit().await.wrap_err("failed to commit seed data")?;
    info!(team = TEAM, event = event.id, at = %event.scheduled_at, "seeded database");

    Ok(())
}

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The database to seed
    #[arg(short, long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// How many hours from now the sample event starts
    #[arg(long, default_value_t = 2)]
    in_hours: i64,
}
