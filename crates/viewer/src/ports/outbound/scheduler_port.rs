//! Reconnect Scheduler Port - one-shot timer for reconnect attempts

use std::time::Duration;

/// Callback run when a reconnect delay elapses.
pub type ReconnectJob = Box<dyn FnOnce() + Send + 'static>;

/// Port for the reconnect timer
///
/// The connection manager keeps at most one reconnect pending. Cancelling is
/// best effort: a job that still runs after `cancel` must find the manager's
/// timer token stale and do nothing.
pub trait ReconnectSchedulerPort: Send + Sync {
    /// Run `job` once after `delay`, replacing any pending job.
    fn schedule(&self, delay: Duration, job: ReconnectJob);

    /// Drop the pending job, if any.
    fn cancel(&self);
}
