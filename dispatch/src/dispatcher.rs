use crate::{
    Agenda, Clock, Composer, ContinuationTrigger, Directory, Envelope, NotificationSender,
    RemoteError, RunCheckpoint, Snapshot, SystemClock, Telemetry, TelemetryEvent, Tracker,
};
use chrono::{DateTime, Duration, Utc};
use database::{Event, Member};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

/// How far ahead of a run events are considered relevant
const LOOKAHEAD_HOURS: i64 = 24;

/// What a run managed to do before it stopped
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Report {
    /// How many reminders were accepted for delivery
    pub notified: usize,
    /// The reminders that could not be delivered
    pub failures: Vec<DeliveryFailure>,
}

/// A reminder that could not be delivered
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DeliveryFailure {
    pub organization: String,
    pub member: String,
    pub reason: String,
}

/// How a run ended
#[derive(Debug)]
pub enum Outcome {
    /// Every member of every organization was handled
    Completed(Report),
    /// The time budget ran out before every member was handled
    Interrupted {
        report: Report,
        /// Where the next invocation should resume from
        checkpoint: RunCheckpoint,
        /// Whether the next invocation was successfully scheduled
        continuation: Result<(), RemoteError>,
    },
}

impl Outcome {
    pub fn report(&self) -> &Report {
        match self {
            Outcome::Completed(report) => report,
            Outcome::Interrupted { report, .. } => report,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

/// Drives reminder runs across every organization and member
#[derive(Clone)]
pub struct Dispatcher {
    directory: Arc<dyn Directory>,
    sender: Arc<dyn NotificationSender>,
    continuation: Arc<dyn ContinuationTrigger>,
    telemetry: Option<Arc<dyn Telemetry>>,
    clock: Arc<dyn Clock>,
    composer: Composer,
    /// The address reminders are sent from
    from: String,
    /// How long a single invocation may spend sending reminders
    budget: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with a 10 second budget, using the system clock
    pub fn new(
        directory: Arc<dyn Directory>,
        sender: Arc<dyn NotificationSender>,
        continuation: Arc<dyn ContinuationTrigger>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            sender,
            continuation,
            telemetry: None,
            clock: Arc::new(SystemClock),
            composer: Composer::default(),
            from: from.into(),
            budget: Duration::seconds(10),
        }
    }

    /// Set how long a single invocation may run for
    ///
    /// The budget is measured from the start of the invocation, so loading the snapshot counts
    /// against it. A snapshot that always takes longer to load than the budget means no run ever
    /// claims a member; the budget must leave room for the load.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Set the clock used for the time budget and event relevance
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set how reminders are rendered
    pub fn composer(mut self, composer: Composer) -> Self {
        self.composer = composer;
        self
    }

    /// Report notable moments to a telemetry sink
    pub fn telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Perform a run, resuming from a previous invocation's checkpoint if there is one
    #[instrument(
        name = "Dispatcher::run",
        skip_all,
        fields(resumed = prior.is_some(), budget_ms = self.budget.num_milliseconds())
    )]
    pub async fn run(&self, prior: Option<RunCheckpoint>) -> database::Result<Outcome> {
        let started = self.clock.now();
        self.record(TelemetryEvent::RunStarted {
            resumed: prior.is_some(),
        });

        let snapshot = match self.directory.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                error!(%error, "failed to load snapshot");
                self.record(TelemetryEvent::RunAborted(&error));
                return Err(error);
            }
        };
        let outcome = self.dispatch(&snapshot, Tracker::new(prior), started).await;

        let report = outcome.report();
        info!(
            completed = outcome.is_completed(),
            notified = report.notified,
            failed = report.failures.len(),
            "reminder run stopped"
        );
        self.record(TelemetryEvent::RunFinished {
            completed: outcome.is_completed(),
            notified: report.notified,
            failed: report.failures.len(),
        });

        Ok(outcome)
    }

    async fn dispatch(
        &self,
        snapshot: &Snapshot,
        mut tracker: Tracker,
        started: DateTime<Utc>,
    ) -> Outcome {
        let window = Duration::hours(LOOKAHEAD_HOURS);
        let relevant = snapshot
            .events
            .iter()
            .filter(|event| event.starts_within(started, window))
            .collect::<Vec<_>>();
        debug!(relevant = relevant.len(), "found events happening soon");

        let members = members_by_organization(&snapshot.members);
        let mut report = Report::default();

        for organization in &snapshot.organizations {
            let team = organization.team.as_str();
            if tracker.is_org_done(team) {
                debug!(%team, "organization already handled");
                continue;
            }
            tracker.begin_org(team);

            let events = relevant
                .iter()
                .copied()
                .filter(|event| event.team == team)
                .collect::<Vec<&Event>>();

            for member in members.get(team).into_iter().flatten() {
                if tracker.is_member_done(team, &member.user_id) {
                    continue;
                }

                let elapsed = self.clock.now() - started;
                if elapsed > self.budget {
                    info!(
                        %team,
                        member = %member.user_id,
                        elapsed_ms = elapsed.num_milliseconds(),
                        "time budget exhausted"
                    );
                    return self.interrupt(tracker, report).await;
                }

                // claimed before sending so a crash mid-send never leads to a second reminder
                tracker.mark_member_done(team, &member.user_id);

                let agenda = Agenda::collect(events.iter().copied(), &member.user_id);
                let message = self
                    .composer
                    .compose(member, &agenda, &organization.name, started);
                let envelope = Envelope {
                    to: member.email.clone(),
                    from: self.from.clone(),
                    subject: message.subject,
                    body: message.body,
                };

                match self.sender.send(&envelope).await {
                    Ok(()) => report.notified += 1,
                    Err(error) => {
                        warn!(%team, member = %member.user_id, %error, "failed to deliver reminder");

                        let failure = DeliveryFailure {
                            organization: organization.team.clone(),
                            member: member.user_id.clone(),
                            reason: error.to_string(),
                        };
                        self.record(TelemetryEvent::DeliveryFailed(&failure));
                        report.failures.push(failure);
                    }
                }
            }

            tracker.mark_org_done(team);
        }

        Outcome::Completed(report)
    }

    /// Stop the run and hand off to the next invocation
    async fn interrupt(&self, tracker: Tracker, report: Report) -> Outcome {
        let checkpoint = tracker.into_checkpoint();

        let continuation = self.continuation.schedule(&checkpoint).await;
        match &continuation {
            Ok(()) => info!("scheduled continuation"),
            Err(error) => error!(%error, "failed to schedule continuation"),
        }

        Outcome::Interrupted {
            report,
            checkpoint,
            continuation,
        }
    }

    fn record(&self, event: TelemetryEvent<'_>) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record(event);
        }
    }
}

/// Group members by organization, keeping their snapshot order
fn members_by_organization(members: &[Member]) -> HashMap<&str, Vec<&Member>> {
    members.iter().fold(HashMap::new(), |mut map, member| {
        map.entry(member.team.as_str()).or_default().push(member);
        map
    })
}
