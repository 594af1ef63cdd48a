use crate::DeliveryFailure;
use tracing::info;

/// Notable moments during a run
#[derive(Debug)]
pub enum TelemetryEvent<'r> {
    /// A run is starting
    RunStarted { resumed: bool },
    /// A run stopped, either because it finished or ran out of time
    RunFinished {
        completed: bool,
        notified: usize,
        failed: usize,
    },
    /// A reminder could not be delivered
    DeliveryFailed(&'r DeliveryFailure),
    /// A run ended before sending anything because its snapshot could not be loaded
    RunAborted(&'r database::Error),
}

/// An observability side-channel
///
/// Implementations must return promptly; anything slow belongs in a background task.
pub trait Telemetry: Send + Sync {
    fn record(&self, event: TelemetryEvent<'_>);
}

/// Records telemetry as log lines
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn record(&self, event: TelemetryEvent<'_>) {
        match event {
            TelemetryEvent::RunStarted { resumed } => info!(resumed, "reminder run started"),
            TelemetryEvent::RunFinished {
                completed,
                notified,
                failed,
            } => info!(completed, notified, failed, "reminder run finished"),
            TelemetryEvent::DeliveryFailed(failure) => info!(
                organization = %failure.organization,
                member = %failure.member,
                reason = %failure.reason,
                "reminder delivery failed"
            ),
            TelemetryEvent::RunAborted(error) => info!(%error, "reminder run aborted"),
        }
    }
}
