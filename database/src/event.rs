use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, Executor, FromRow};
use tracing::instrument;

/// An event put on by an organization
#[derive(Clone, Debug, Deserialize, Eq, FromRow, PartialEq, Serialize)]
pub struct Event {
    /// A unique ID
    pub id: i32,
    /// The organization holding the event
    pub team: String,
    /// Display name of the event
    pub name: String,
    /// Free-form notes from the organizers
    pub comments: String,
    /// When the event starts
    pub scheduled_at: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Members who confirmed they are going
    pub status_going: String,
    /// Members who might be going
    pub status_maybe: String,
    /// Members who declined
    pub status_not_going: String,
}

impl Event {
    /// Get all the events, soonest first
    #[instrument(name = "Event::all", skip_all)]
    pub async fn all<'c, 'e, E>(db: E) -> Result<Vec<Event>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let events = query_as::<_, Event>("SELECT * FROM events ORDER BY scheduled_at, id")
            .fetch_all(db)
            .await?;

        Ok(events)
    }

    /// Create a new event
    #[instrument(name = "Event::create", skip_all, fields(team = event.team, name = event.name))]
    pub async fn create<'c, 'e, E>(event: NewEvent<'_>, db: E) -> Result<Event>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let event = query_as::<_, Event>(
            r#"
            INSERT INTO events (team, name, comments, scheduled_at, location, status_going, status_maybe, status_not_going)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *
            "#,
        )
        .bind(event.team)
        .bind(event.name)
        .bind(event.comments)
        .bind(event.scheduled_at)
        .bind(event.location)
        .bind(event.going.join(","))
        .bind(event.maybe.join(","))
        .bind(event.not_going.join(","))
        .fetch_one(db)
        .await?;

        Ok(event)
    }

    /// Whether the event starts strictly within `window` after `now`
    pub fn starts_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.scheduled_at > now && self.scheduled_at < now + window
    }

    /// Whether the member confirmed they are going
    pub fn is_going(&self, user_id: &str) -> bool {
        contains_token(&self.status_going, user_id)
    }

    /// Whether the member might be going
    pub fn is_maybe(&self, user_id: &str) -> bool {
        contains_token(&self.status_maybe, user_id)
    }

    /// Whether the member declined
    pub fn is_not_going(&self, user_id: &str) -> bool {
        contains_token(&self.status_not_going, user_id)
    }
}

/// The fields needed to create an event
#[derive(Debug)]
pub struct NewEvent<'e> {
    pub team: &'e str,
    pub name: &'e str,
    pub comments: &'e str,
    pub scheduled_at: DateTime<Utc>,
    pub location: &'e str,
    pub going: &'e [&'e str],
    pub maybe: &'e [&'e str],
    pub not_going: &'e [&'e str],
}

/// Status columns hold member IDs separated by commas and/or whitespace
fn contains_token(field: &str, user_id: &str) -> bool {
    !user_id.is_empty()
        && field
            .split(|c: char| c == ',' || c.is_whitespace())
            .any(|token| token == user_id)
}
