//! Hand-cranked reconnect timer for testing
//!
//! Nothing runs until the test calls [`ManualScheduler::fire`]. Cancelled jobs
//! are kept aside so a test can run one anyway and check that a timer which
//! lost the race against `cancel` has no effect.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::outbound::{ReconnectJob, ReconnectSchedulerPort};

#[derive(Default)]
struct State {
    pending: Option<ReconnectJob>,
    cancelled: Vec<ReconnectJob>,
    delays: Vec<Duration>,
    cancel_count: usize,
}

#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<State>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every delay passed to `schedule`, oldest first.
    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.state().delays.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.state().pending.is_some()
    }

    pub fn cancel_count(&self) -> usize {
        self.state().cancel_count
    }

    /// Run the pending job. Returns `false` if nothing was pending.
    pub fn fire(&self) -> bool {
        let job = self.state().pending.take();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run the most recently cancelled job as if its timer had already fired.
    pub fn fire_cancelled(&self) -> bool {
        let job = self.state().cancelled.pop();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

impl ReconnectSchedulerPort for ManualScheduler {
    fn schedule(&self, delay: Duration, job: ReconnectJob) {
        let mut state = self.state();
        state.delays.push(delay);
        if let Some(previous) = state.pending.replace(job) {
            state.cancelled.push(previous);
        }
    }

    fn cancel(&self) {
        let mut state = self.state();
        state.cancel_count += 1;
        if let Some(job) = state.pending.take() {
            state.cancelled.push(job);
        }
    }
}
