use dispatch::{Envelope, NotificationSender, RemoteError};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::instrument;
use url::Url;

/// Delivers reminders through an email-sending HTTP endpoint
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    url: Arc<Url>,
    api_key: Arc<str>,
}

impl Mailer {
    pub fn new(url: Url, api_key: &str) -> Self {
        Self {
            client: super::build(Duration::from_secs(5)),
            url: Arc::new(url),
            api_key: Arc::from(api_key),
        }
    }
}

#[async_trait::async_trait]
impl NotificationSender for Mailer {
    #[instrument(name = "Mailer::send", skip_all, fields(to = %envelope.to))]
    async fn send(&self, envelope: &Envelope) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.url.as_str())
            .bearer_auth(&self.api_key)
            .json(&Email {
                to: &envelope.to,
                from: &envelope.from,
                subject: &envelope.subject,
                text: &envelope.body,
            });

        super::send(request).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct Email<'e> {
    to: &'e str,
    from: &'e str,
    subject: &'e str,
    text: &'e str,
}
