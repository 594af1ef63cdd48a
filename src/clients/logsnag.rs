use dispatch::{RemoteError, Telemetry, TelemetryEvent};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{error, instrument, span, warn, Instrument, Level, Span};
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://api.logsnag.com/v1/log";

/// Publishes run telemetry to LogSnag
#[derive(Clone)]
pub struct LogSnag {
    client: reqwest::Client,
    endpoint: Arc<Url>,
    token: Arc<str>,
    project: Arc<str>,
    channel: Arc<str>,
}

impl LogSnag {
    pub fn new(token: &str, project: &str, channel: &str) -> Self {
        Self {
            client: super::build(Duration::from_secs(3)),
            endpoint: Arc::new(DEFAULT_ENDPOINT.parse().expect("url is always valid")),
            token: Arc::from(token),
            project: Arc::from(project),
            channel: Arc::from(channel),
        }
    }

    /// Send logs somewhere other than the public API
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Arc::new(endpoint);
        self
    }

    /// Publish a single log entry
    #[instrument(name = "LogSnag::publish", skip_all, fields(event = entry.event))]
    pub async fn publish(&self, entry: &LogEntry) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.endpoint.as_str())
            .bearer_auth(&self.token)
            .json(&Payload {
                project: &self.project,
                channel: &self.channel,
                entry,
            });

        super::send(request).await?;
        Ok(())
    }
}

impl Telemetry for LogSnag {
    fn record(&self, event: TelemetryEvent<'_>) {
        let entry = LogEntry::from(event);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(event = entry.event, "no runtime to publish telemetry on");
            return;
        };

        let span = span!(Level::INFO, "LogSnag::record", event = entry.event);
        span.follows_from(Span::current());

        let logsnag = self.clone();
        runtime.spawn(
            async move {
                if let Err(error) = logsnag.publish(&entry).await {
                    error!(%error, "failed to publish telemetry");
                }
            }
            .instrument(span),
        );
    }
}

/// A single LogSnag log entry
#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct LogEntry {
    pub event: &'static str,
    pub description: String,
    pub icon: &'static str,
    pub notify: bool,
}

impl From<TelemetryEvent<'_>> for LogEntry {
    fn from(event: TelemetryEvent<'_>) -> Self {
        match event {
            TelemetryEvent::RunStarted { resumed } => LogEntry {
                event: "Reminder run started",
                description: if resumed {
                    String::from("Resuming from a checkpoint")
                } else {
                    String::from("Starting a fresh run")
                },
                icon: "⏰",
                notify: false,
            },
            TelemetryEvent::RunFinished {
                completed,
                notified,
                failed,
            } => LogEntry {
                event: if completed {
                    "Reminder run completed"
                } else {
                    "Reminder run interrupted"
                },
                description: format!("{notified} reminders sent, {failed} failed"),
                icon: if completed { "✅" } else { "⏸️" },
                notify: false,
            },
            TelemetryEvent::DeliveryFailed(failure) => LogEntry {
                event: "Reminder delivery failed",
                description: format!(
                    "{} in {}: {}",
                    failure.member, failure.organization, failure.reason
                ),
                icon: "📭",
                notify: true,
            },
            TelemetryEvent::RunAborted(error) => LogEntry {
                event: "Reminder run aborted",
                description: format!("Could not load reminder data: {error}"),
                icon: "🚨",
                notify: true,
            },
        }
    }
}

#[derive(Serialize)]
struct Payload<'p> {
    project: &'p str,
    channel: &'p str,
    #[serde(flatten)]
    entry: &'p LogEntry,
}

#[cfg(test)]
mod tests {
    use super::{LogEntry, LogSnag};
    use dispatch::{DeliveryFailure, TelemetryEvent};
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn delivery_failures_notify() {
        let failure = DeliveryFailure {
            organization: String::from("T1"),
            member: String::from("U1"),
            reason: String::from("mailbox full"),
        };

        let entry = LogEntry::from(TelemetryEvent::DeliveryFailed(&failure));

        assert!(entry.notify);
        assert_eq!(entry.description, "U1 in T1: mailbox full");
    }

    #[test]
    fn aborted_runs_notify() {
        let error = database::Error::PoolTimedOut;

        let entry = LogEntry::from(TelemetryEvent::RunAborted(&error));

        assert_eq!(entry.event, "Reminder run aborted");
        assert!(entry.description.starts_with("Could not load reminder data: "));
        assert!(entry.notify);
    }

    #[test]
    fn interrupted_runs_are_labelled() {
        let entry = LogEntry::from(TelemetryEvent::RunFinished {
            completed: false,
            notified: 4,
            failed: 1,
        });

        assert_eq!(entry.event, "Reminder run interrupted");
        assert_eq!(entry.description, "4 reminders sent, 1 failed");
        assert!(!entry.notify);
    }

    #[tokio::test]
    async fn publishes_with_project_and_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/log"))
            .and(header("authorization", "Bearer token"))
            .and(body_json(serde_json::json!({
                "project": "teamevents",
                "channel": "reminders",
                "event": "Reminder run started",
                "description": "Starting a fresh run",
                "icon": "⏰",
                "notify": false,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let logsnag = LogSnag::new("token", "teamevents", "reminders")
            .endpoint(format!("{}/v1/log", server.uri()).parse().unwrap());
        let entry = LogEntry::from(TelemetryEvent::RunStarted { resumed: false });

        logsnag.publish(&entry).await.unwrap();
    }
}
