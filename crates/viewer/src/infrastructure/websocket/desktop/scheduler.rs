//! Desktop reconnect timer using tokio

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ports::outbound::{ReconnectJob, ReconnectSchedulerPort};

/// One-shot reconnect timer backed by `tokio::time::sleep`.
#[derive(Default)]
pub struct TokioScheduler {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReconnectSchedulerPort for TokioScheduler {
    fn schedule(&self, delay: Duration, job: ReconnectJob) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("Cannot schedule reconnect without a tokio runtime: {}", e);
                return;
            }
        };

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });
        if let Some(previous) = self.pending().replace(handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
    }
}
