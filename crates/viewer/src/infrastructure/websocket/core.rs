//! Platform-agnostic core logic for the viewer WebSocket client.
//!
//! This is free of any runtime / platform dependencies (tokio, web-sys, etc).
//! The connection manager feeds socket and timer events into
//! [`ConnectionMachine`] and executes the [`Effect`]s it returns.

use crate::config::ReconnectConfig;
use crate::infrastructure::messaging::ConnectionState;

/// Exponential backoff state shared by reconnect logic.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    config: ReconnectConfig,
    attempts: u32,
    delay_ms: u64,
}

impl BackoffState {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
            delay_ms: config.base_delay_ms.min(config.max_delay_ms),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay the next scheduled attempt will wait.
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    /// Take the delay for the next attempt and grow it for the one after.
    ///
    /// Returns `None` once the attempt budget is spent.
    pub fn next_delay(&mut self) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }

        let current_delay = self.delay_ms;
        self.delay_ms = ((self.delay_ms as f64) * self.config.growth_factor)
            .min(self.config.max_delay_ms as f64) as u64;
        Some(current_delay)
    }

    /// Count a reconnect attempt as started.
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}

/// Side effect requested by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Open a socket whose events are tagged with `epoch`.
    OpenSocket { epoch: u64 },
    /// Close the current socket.
    CloseSocket,
    /// Run the reconnect timer identified by `token` after `delay_ms`.
    ScheduleReconnect { token: u64, delay_ms: u64 },
    /// Drop the pending reconnect timer.
    CancelReconnect,
    /// The attempt budget is spent; nothing further will be scheduled.
    Exhausted { attempts: u32 },
}

/// Connection state machine.
///
/// Every socket gets a new epoch and every reconnect timer a new token.
/// Events carrying an epoch or token other than the current one are stale and
/// change nothing, which is what makes `close()` final even when a timer or a
/// socket callback is already in flight.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    backoff: BackoffState,
    epoch: u64,
    pending_timer: Option<u64>,
    next_token: u64,
}

impl ConnectionMachine {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff: BackoffState::new(config),
            epoch: 0,
            pending_timer: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.backoff.attempts()
    }

    pub fn delay_ms(&self) -> u64 {
        self.backoff.delay_ms()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending_timer(&self) -> Option<u64> {
        self.pending_timer
    }

    /// Whether events tagged with `epoch` belong to the current socket.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.state.is_active()
    }

    fn open_socket(&mut self) -> Effect {
        self.epoch += 1;
        self.state = ConnectionState::Connecting;
        Effect::OpenSocket { epoch: self.epoch }
    }

    /// Explicit connect. Starts over from a fresh backoff.
    ///
    /// Only valid from `Disconnected` or `Failed`; otherwise a no-op.
    pub fn connect(&mut self) -> Vec<Effect> {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                self.backoff.reset();
                self.pending_timer = None;
                vec![self.open_socket()]
            }
            _ => Vec::new(),
        }
    }

    /// The socket tagged `epoch` finished its handshake.
    pub fn on_open(&mut self, epoch: u64) -> Vec<Effect> {
        if epoch != self.epoch || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.state = ConnectionState::Connected;
        self.backoff.reset();
        Vec::new()
    }

    /// The socket tagged `epoch` went away without `close()` being called.
    pub fn on_close(&mut self, epoch: u64) -> Vec<Effect> {
        if !self.is_current(epoch) {
            return Vec::new();
        }

        match self.backoff.next_delay() {
            Some(delay_ms) => {
                let token = self.next_token;
                self.next_token += 1;
                self.pending_timer = Some(token);
                self.state = ConnectionState::Reconnecting;
                vec![Effect::ScheduleReconnect { token, delay_ms }]
            }
            None => {
                self.state = ConnectionState::Failed;
                vec![Effect::Exhausted {
                    attempts: self.backoff.attempts(),
                }]
            }
        }
    }

    /// The reconnect timer identified by `token` fired.
    pub fn on_timer(&mut self, token: u64) -> Vec<Effect> {
        if self.state != ConnectionState::Reconnecting || self.pending_timer != Some(token) {
            return Vec::new();
        }
        self.pending_timer = None;
        self.backoff.record_attempt();
        vec![self.open_socket()]
    }

    /// Explicit close. Invalidates the current socket and any pending timer.
    pub fn close(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.is_active() {
            effects.push(Effect::CloseSocket);
        }
        if self.pending_timer.take().is_some() {
            effects.push(Effect::CancelReconnect);
        }
        self.epoch += 1;
        self.state = ConnectionState::Disconnected;
        effects
    }
}
