//! Time-budgeted, resumable delivery of daily event reminders.
//!
//! A run walks every organization and every member in a [`Snapshot`], sending one reminder per
//! member. When the time budget runs out mid-run, the progress made so far is captured in a
//! [`RunCheckpoint`] and handed to a [`ContinuationTrigger`], which schedules another invocation
//! that picks up exactly where this one stopped.

mod checkpoint;
mod clock;
mod composer;
mod continuation;
mod directory;
mod dispatcher;
mod error;
mod notify;
mod telemetry;

pub use checkpoint::{OrgProgress, RunCheckpoint, Tracker};
pub use clock::{Clock, SystemClock};
pub use composer::{Agenda, Composer, Message};
pub use continuation::ContinuationTrigger;
pub use directory::{Directory, Snapshot};
pub use dispatcher::{DeliveryFailure, Dispatcher, Outcome, Report};
pub use error::RemoteError;
pub use notify::{Envelope, NotificationSender};
pub use telemetry::{Telemetry, TelemetryEvent, TracingTelemetry};
