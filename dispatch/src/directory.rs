use async_trait::async_trait;
use database::{Event, Member, Organization, PgPool};
use tracing::{info, instrument};

/// A point-in-time view of everything a run needs
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub organizations: Vec<Organization>,
    pub members: Vec<Member>,
    pub events: Vec<Event>,
}

/// Read-only access to organizations, their members, and their events
#[async_trait]
pub trait Directory: Send + Sync {
    /// Load a full, unfiltered snapshot
    async fn snapshot(&self) -> database::Result<Snapshot>;
}

#[async_trait]
impl Directory for PgPool {
    #[instrument(name = "Directory::snapshot", skip_all)]
    async fn snapshot(&self) -> database::Result<Snapshot> {
        let (organizations, members, events) = futures::try_join!(
            Organization::all(self),
            Member::all(self),
            Event::all(self),
        )?;

        info!(
            organizations = organizations.len(),
            members = members.len(),
            events = events.len(),
            "loaded snapshot"
        );

        Ok(Snapshot {
            organizations,
            members,
            events,
        })
    }
}
