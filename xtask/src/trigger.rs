use dispatch::RunCheckpoint;
use eyre::{eyre, WrapErr};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

pub async fn run(args: Args) -> eyre::Result<()> {
    let mut checkpoint = match &args.checkpoint {
        Some(path) => Some(read_checkpoint(path).await?),
        None => None,
    };

    let client = reqwest::Client::new();
    let mut attempts = 0;

    loop {
        attempts += 1;

        let mut request = client
            .post(args.url.as_str())
            .header("Authorization", &args.api_secret);
        if let Some(checkpoint) = &checkpoint {
            request = request.json(checkpoint);
        }

        let response = request.send().await.wrap_err("failed to reach service")?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .wrap_err("invalid response body")?;

        match status {
            StatusCode::OK => {
                info!(attempts, notified = %body["notified"], "run completed");
                return Ok(());
            }
            StatusCode::REQUEST_TIMEOUT if args.follow => {
                warn!(attempts, notified = %body["notified"], "run interrupted, resuming");
                let next = serde_json::from_value::<RunCheckpoint>(body["checkpoint"].clone())
                    .wrap_err("interrupted run returned an invalid checkpoint")?;
                checkpoint = Some(next);
            }
            StatusCode::REQUEST_TIMEOUT => {
                info!(checkpoint = %body["checkpoint"], continuation = %body["continuation"], "run interrupted");
                return Ok(());
            }
            _ => return Err(eyre!("unexpected response ({status}): {body}")),
        }
    }
}

async fn read_checkpoint(path: &PathBuf) -> eyre::Result<RunCheckpoint> {
    let raw = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;

    RunCheckpoint::from_payload(&raw)
        .wrap_err("invalid checkpoint")?
        .ok_or_else(|| eyre!("checkpoint file is empty"))
}

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The reminder endpoint to call
    #[arg(long, default_value = "http://127.0.0.1:4321/remind")]
    url: Url,

    /// The secret the service expects
    #[arg(long, env = "API_SECRET", hide_env_values = true)]
    api_secret: String,

    /// A checkpoint file to resume from
    #[arg(short, long)]
    checkpoint: Option<PathBuf>,

    /// Keep resuming interrupted runs until one completes
    #[arg(short, long)]
    follow: bool,
}
