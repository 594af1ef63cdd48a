use dispatch::{ContinuationTrigger, RemoteError, RunCheckpoint};
use reqwest::header::AUTHORIZATION;
use std::{sync::Arc, time::Duration};
use tracing::instrument;
use url::Url;

/// Schedules follow-up runs by calling a webhook with the checkpoint
#[derive(Clone)]
pub struct Continuation {
    client: reqwest::Client,
    url: Arc<Url>,
    secret: Arc<str>,
}

impl Continuation {
    pub fn new(url: Url, secret: &str) -> Self {
        Self {
            client: super::build(Duration::from_secs(5)),
            url: Arc::new(url),
            secret: Arc::from(secret),
        }
    }
}

#[async_trait::async_trait]
impl ContinuationTrigger for Continuation {
    #[instrument(
        name = "Continuation::schedule",
        skip_all,
        fields(organizations = checkpoint.organizations.len())
    )]
    async fn schedule(&self, checkpoint: &RunCheckpoint) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.url.as_str())
            .header(AUTHORIZATION, &*self.secret)
            .json(checkpoint);

        super::send(request).await?;
        Ok(())
    }
}
