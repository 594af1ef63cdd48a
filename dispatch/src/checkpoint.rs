use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The progress of a run, carried between invocations
///
/// This is the only state that survives an interrupted run, so it must fully describe what has
/// already been done.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RunCheckpoint {
    /// Progress for each organization that has been started, in the order they were visited
    #[serde(default)]
    pub organizations: Vec<OrgProgress>,
}

/// How far a run got through a single organization
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrgProgress {
    /// The organization's team ID
    pub organization: String,
    /// The members who have already been claimed for a reminder
    #[serde(default)]
    pub notified: BTreeSet<String>,
    /// Whether every member of the organization has been handled
    #[serde(default)]
    pub completed: bool,
}

impl OrgProgress {
    fn new(organization: &str) -> Self {
        Self {
            organization: organization.to_owned(),
            notified: BTreeSet::new(),
            completed: false,
        }
    }
}

impl RunCheckpoint {
    /// Parse a checkpoint from a request payload
    ///
    /// An empty payload means there is nothing to resume from.
    pub fn from_payload(payload: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(payload).map(Some)
    }

    /// Whether no progress has been recorded
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}

/// Tracks which organizations and members have been handled during a run
#[derive(Debug, Default)]
pub struct Tracker {
    checkpoint: RunCheckpoint,
    /// Position of each organization's progress within the checkpoint
    index: HashMap<String, usize>,
}

impl Tracker {
    /// Start tracking, resuming from a previous invocation's checkpoint if there is one
    pub fn new(prior: Option<RunCheckpoint>) -> Self {
        let checkpoint = prior.unwrap_or_default();

        let mut index = HashMap::with_capacity(checkpoint.organizations.len());
        for (position, progress) in checkpoint.organizations.iter().enumerate() {
            index.entry(progress.organization.clone()).or_insert(position);
        }

        Self { checkpoint, index }
    }

    /// Whether every member of the organization has been handled
    pub fn is_org_done(&self, organization: &str) -> bool {
        self.progress(organization)
            .map(|progress| progress.completed)
            .unwrap_or_default()
    }

    /// Whether the member has already been claimed within the organization
    pub fn is_member_done(&self, organization: &str, member: &str) -> bool {
        self.progress(organization)
            .map(|progress| progress.notified.contains(member))
            .unwrap_or_default()
    }

    /// Start tracking an organization, leaving any existing progress untouched
    pub fn begin_org(&mut self, organization: &str) {
        self.progress_mut(organization);
    }

    /// Record that the member has been claimed within the organization
    pub fn mark_member_done(&mut self, organization: &str, member: &str) {
        self.progress_mut(organization)
            .notified
            .insert(member.to_owned());
    }

    /// Record that every member of the organization has been handled
    pub fn mark_org_done(&mut self, organization: &str) {
        self.progress_mut(organization).completed = true;
    }

    /// The current progress, as it would be handed to the next invocation
    pub fn serialize(&self) -> RunCheckpoint {
        self.checkpoint.clone()
    }

    /// Stop tracking, returning the final progress
    pub fn into_checkpoint(self) -> RunCheckpoint {
        self.checkpoint
    }

    fn progress(&self, organization: &str) -> Option<&OrgProgress> {
        self.index
            .get(organization)
            .map(|&position| &self.checkpoint.organizations[position])
    }

    fn progress_mut(&mut self, organization: &str) -> &mut OrgProgress {
        let position = match self.index.get(organization) {
            Some(&position) => position,
            None => {
                let position = self.checkpoint.organizations.len();
                self.checkpoint
                    .organizations
                    .push(OrgProgress::new(organization));
                self.index.insert(organization.to_owned(), position);
                position
            }
        };

        &mut self.checkpoint.organizations[position]
    }
}

#[cfg(test)]
mod tests {
    use super::{OrgProgress, RunCheckpoint, Tracker};
    use std::collections::BTreeSet;

    fn progress(organization: &str, notified: &[&str], completed: bool) -> OrgProgress {
        OrgProgress {
            organization: organization.to_owned(),
            notified: notified.iter().map(|m| m.to_string()).collect(),
            completed,
        }
    }

    #[test]
    fn starts_empty_without_prior_checkpoint() {
        let tracker = Tracker::new(None);
        assert!(!tracker.is_org_done("T1"));
        assert!(!tracker.is_member_done("T1", "U1"));
        assert!(tracker.serialize().is_empty());
    }

    #[test]
    fn marking_a_member_twice_is_idempotent() {
        let mut once = Tracker::new(None);
        once.begin_org("T1");
        once.mark_member_done("T1", "U1");

        let mut twice = Tracker::new(None);
        twice.begin_org("T1");
        twice.mark_member_done("T1", "U1");
        twice.mark_member_done("T1", "U1");

        assert_eq!(once.serialize(), twice.serialize());
        assert_eq!(
            twice.serialize().organizations[0].notified,
            BTreeSet::from([String::from("U1")])
        );
    }

    #[test]
    fn begin_org_never_resets_progress() {
        let mut tracker = Tracker::new(None);
        tracker.begin_org("T1");
        tracker.mark_member_done("T1", "U1");
        tracker.mark_org_done("T1");

        tracker.begin_org("T1");

        assert!(tracker.is_org_done("T1"));
        assert!(tracker.is_member_done("T1", "U1"));
        assert_eq!(tracker.serialize().organizations.len(), 1);
    }

    #[test]
    fn members_are_tracked_per_organization() {
        let mut tracker = Tracker::new(None);
        tracker.begin_org("T1");
        tracker.mark_member_done("T1", "U1");

        assert!(tracker.is_member_done("T1", "U1"));
        assert!(!tracker.is_member_done("T2", "U1"));
        assert!(!tracker.is_org_done("T1"));
    }

    #[test]
    fn resumes_from_prior_checkpoint() {
        let prior = RunCheckpoint {
            organizations: vec![progress("T1", &["U1", "U2"], true), progress("T2", &["U3"], false)],
        };

        let tracker = Tracker::new(Some(prior.clone()));

        assert!(tracker.is_org_done("T1"));
        assert!(!tracker.is_org_done("T2"));
        assert!(tracker.is_member_done("T2", "U3"));
        assert!(!tracker.is_member_done("T2", "U4"));
        assert_eq!(tracker.serialize(), prior);
    }

    #[test]
    fn serialized_state_keeps_visit_order() {
        let mut tracker = Tracker::new(None);
        tracker.begin_org("T2");
        tracker.begin_org("T1");
        tracker.mark_member_done("T1", "U9");

        let checkpoint = tracker.into_checkpoint();
        let order: Vec<_> = checkpoint
            .organizations
            .iter()
            .map(|p| p.organization.as_str())
            .collect();
        assert_eq!(order, ["T2", "T1"]);
    }

    #[test]
    fn payload_round_trips_through_json() {
        let checkpoint = RunCheckpoint {
            organizations: vec![progress("T1", &["U1"], false)],
        };
        let payload = serde_json::to_vec(&checkpoint).unwrap();

        assert_eq!(
            String::from_utf8_lossy(&payload),
            r#"{"organizations":[{"organization":"T1","notified":["U1"],"completed":false}]}"#
        );
        assert_eq!(
            RunCheckpoint::from_payload(&payload).unwrap(),
            Some(checkpoint)
        );
    }

    #[test]
    fn empty_payload_means_nothing_to_resume() {
        assert_eq!(RunCheckpoint::from_payload(b"").unwrap(), None);
        assert_eq!(RunCheckpoint::from_payload(b"  \n").unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(RunCheckpoint::from_payload(b"{\"organizations\":").is_err());
        assert!(RunCheckpoint::from_payload(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let checkpoint = RunCheckpoint::from_payload(br#"{"organizations":[{"organization":"T1"}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(checkpoint.organizations, vec![progress("T1", &[], false)]);
    }
}
