use crate::{RemoteError, RunCheckpoint};
use async_trait::async_trait;

/// Schedules a follow-up invocation that resumes from a checkpoint
#[async_trait]
pub trait ContinuationTrigger: Send + Sync {
    /// Hand off the checkpoint, returning once the scheduler has acknowledged it
    async fn schedule(&self, checkpoint: &RunCheckpoint) -> Result<(), RemoteError>;
}
