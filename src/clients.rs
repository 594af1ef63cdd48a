use dispatch::RemoteError;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;

mod continuation;
mod logsnag;
mod mailer;

pub use continuation::Continuation;
pub use logsnag::LogSnag;
pub use mailer::Mailer;

const USER_AGENT: &str = "teamevents/reminders";

/// Build an HTTP client for talking to a collaborator
fn build(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .expect("client must build")
}

/// Send a request, treating anything but a successful status as a failure
async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request.send().await.map_err(RemoteError::transport)?;

    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let content = response.text().await.unwrap_or_default();
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            content,
        })
    }
}
