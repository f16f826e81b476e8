//! WASM reconnect timer using gloo-timers

use std::cell::RefCell;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use send_wrapper::SendWrapper;

use crate::ports::outbound::{ReconnectJob, ReconnectSchedulerPort};

/// One-shot reconnect timer backed by `setTimeout`.
pub struct TimeoutScheduler {
    pending: SendWrapper<RefCell<Option<Timeout>>>,
}

impl Default for TimeoutScheduler {
    fn default() -> Self {
        Self {
            pending: SendWrapper::new(RefCell::new(None)),
        }
    }
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReconnectSchedulerPort for TimeoutScheduler {
    fn schedule(&self, delay: Duration, job: ReconnectJob) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, job);
        // Dropping a `Timeout` clears it.
        *self.pending.borrow_mut() = Some(timeout);
    }

    fn cancel(&self) {
        if let Some(timeout) = self.pending.borrow_mut().take() {
            timeout.cancel();
        }
    }
}
