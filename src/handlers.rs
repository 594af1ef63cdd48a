use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use dispatch::{Dispatcher, Outcome, Report, RunCheckpoint};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

mod authorized;
mod error;

use authorized::Authorized;
use error::Result;

/// Check that the service is up
#[instrument(name = "health")]
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Send reminders, resuming from the checkpoint in the body if there is one
#[instrument(name = "remind", skip_all, fields(run = %Uuid::new_v4()))]
pub(crate) async fn remind(
    _: Authorized,
    State(dispatcher): State<Dispatcher>,
    body: Bytes,
) -> Result<Response> {
    let prior = match RunCheckpoint::from_payload(&body) {
        Ok(prior) => prior,
        Err(error) => {
            warn!(%error, "ignoring malformed checkpoint, starting fresh");
            None
        }
    };
    if let Some(prior) = &prior {
        info!(organizations = prior.organizations.len(), "resuming from checkpoint");
    }

    let outcome = dispatcher.run(prior).await?;

    let response = match outcome {
        Outcome::Completed(report) => (
            StatusCode::OK,
            Json(RunResponse {
                ok: true,
                status: "completed",
                report,
                checkpoint: None,
                continuation: None,
            }),
        ),
        Outcome::Interrupted {
            report,
            checkpoint,
            continuation,
        } => (
            StatusCode::REQUEST_TIMEOUT,
            Json(RunResponse {
                ok: false,
                status: "interrupted",
                report,
                checkpoint: Some(checkpoint),
                continuation: Some(ContinuationStatus {
                    scheduled: continuation.is_ok(),
                    error: continuation.err().map(|e| e.to_string()),
                }),
            }),
        ),
    };

    Ok(response.into_response())
}

#[derive(Serialize)]
struct RunResponse {
    ok: bool,
    status: &'static str,
    #[serde(flatten)]
    report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkpoint: Option<RunCheckpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation: Option<ContinuationStatus>,
}

/// Whether the follow-up invocation was scheduled
#[derive(Serialize)]
struct ContinuationStatus {
    scheduled: bool,
    error: Option<String>,
}
