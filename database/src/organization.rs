use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, Executor, FromRow};
use tracing::instrument;

/// A team that members belong to and events are held for
#[derive(Clone, Debug, Deserialize, Eq, FromRow, PartialEq, Serialize)]
pub struct Organization {
    /// The unique team ID, as issued by the sign-in provider
    pub team: String,
    /// Display name of the team
    pub name: String,
    /// URL for the team's icon
    pub image: String,
    /// When the organization was first registered
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Get all the registered organizations, ordered by their team ID
    #[instrument(name = "Organization::all", skip_all)]
    pub async fn all<'c, 'e, E>(db: E) -> Result<Vec<Organization>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let organizations =
            query_as::<_, Organization>("SELECT * FROM organizations ORDER BY team")
                .fetch_all(db)
                .await?;

        Ok(organizations)
    }

    /// Register a new organization, leaving an existing one untouched
    #[instrument(name = "Organization::create", skip(db))]
    pub async fn create<'c, 'e, E>(team: &str, name: &str, image: &str, db: E) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        query(
            r#"
            INSERT INTO organizations (team, name, image) VALUES ($1, $2, $3)
            ON CONFLICT (team) DO NOTHING
            "#,
        )
        .bind(team)
        .bind(name)
        .bind(image)
        .execute(db)
        .await?;

        Ok(())
    }
}
