use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, Executor, FromRow};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use tracing::instrument;

/// A member of an organization
#[derive(Clone, Debug, Deserialize, Eq, FromRow, PartialEq, Serialize)]
pub struct Member {
    /// The unique user ID, as issued by the sign-in provider
    pub user_id: String,
    /// The organization the member belongs to
    pub team: String,
    /// Display name
    pub name: String,
    /// Where reminders get delivered
    pub email: String,
    /// URL for the member's avatar
    pub image: String,
    /// The member's role within the organization
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// When the member first signed in
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Get all the members across every organization, grouped by organization
    #[instrument(name = "Member::all", skip_all)]
    pub async fn all<'c, 'e, E>(db: E) -> Result<Vec<Member>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        let members = query_as::<_, Member>("SELECT * FROM members ORDER BY team, user_id")
            .fetch_all(db)
            .await?;

        Ok(members)
    }

    /// Add a member to an organization, updating their profile if they already exist
    #[instrument(name = "Member::create", skip(db))]
    pub async fn create<'c, 'e, E>(
        user_id: &str,
        team: &str,
        name: &str,
        email: &str,
        role: Role,
        db: E,
    ) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = sqlx::Postgres>,
    {
        query(
            r#"
            INSERT INTO members (user_id, team, name, email, role) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET name = excluded.name, email = excluded.email
            "#,
        )
        .bind(user_id)
        .bind(team)
        .bind(name)
        .bind(email)
        .bind(role.as_str())
        .execute(db)
        .await?;

        Ok(())
    }
}

/// What a member is allowed to do within their organization
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    /// The stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "guest" => Ok(Role::Guest),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The stored role is not one we know about
#[derive(Debug)]
pub struct UnknownRole(String);

impl Display for UnknownRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role {:?}", self.0)
    }
}

impl std::error::Error for UnknownRole {}
