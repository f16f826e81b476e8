//! Connection manager.
//!
//! Adapter between the platform transport/timer and [`ConnectionMachine`]:
//! socket and timer callbacks become machine events, the machine's effects
//! become transport and timer calls, and inbound text frames are decoded and
//! handed to the [`EventRouter`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use microbiome_protocol::Envelope;

use super::core::{ConnectionMachine, Effect};
use super::shared::preview;
use crate::config::ReconnectConfig;
use crate::error::ClientError;
use crate::infrastructure::messaging::{ConnectionState, EventRouter};
use crate::ports::outbound::{
    ReconnectSchedulerPort, TransportEventSink, TransportEvents, TransportPort,
};

type StateCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;
type IssueCallback = Arc<dyn Fn(&ClientError) + Send + Sync>;

struct Shared {
    url: String,
    machine: Mutex<ConnectionMachine>,
    router: EventRouter,
    transport: Arc<dyn TransportPort>,
    scheduler: Arc<dyn ReconnectSchedulerPort>,
    on_state_change: Mutex<Option<StateCallback>>,
    on_issue: Mutex<Option<IssueCallback>>,
}

/// Connection manager for the viewer socket.
///
/// Cloning yields another handle to the same connection. Connection state is
/// guarded by a mutex, so socket and timer callbacks may arrive from any
/// thread. Handlers run outside that lock and may call back into the manager.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    /// Create a manager in the `Disconnected` state without opening a socket.
    pub fn new(
        url: impl Into<String>,
        config: ReconnectConfig,
        transport: Arc<dyn TransportPort>,
        scheduler: Arc<dyn ReconnectSchedulerPort>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                machine: Mutex::new(ConnectionMachine::new(config)),
                router: EventRouter::new(),
                transport,
                scheduler,
                on_state_change: Mutex::new(None),
                on_issue: Mutex::new(None),
            }),
        }
    }

    /// Create a manager and start connecting right away.
    pub fn open(
        url: impl Into<String>,
        config: ReconnectConfig,
        transport: Arc<dyn TransportPort>,
        scheduler: Arc<dyn ReconnectSchedulerPort>,
    ) -> Self {
        let manager = Self::new(url, config, transport, scheduler);
        manager.connect();
        manager
    }

    fn machine(&self) -> MutexGuard<'_, ConnectionMachine> {
        self.shared
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    pub fn state(&self) -> ConnectionState {
        self.machine().state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Reconnect attempts made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.machine().attempts()
    }

    /// Delay the next reconnect would wait.
    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.machine().delay_ms())
    }

    /// The routing table inbound envelopes are dispatched through.
    pub fn router(&self) -> &EventRouter {
        &self.shared.router
    }

    pub fn set_on_state_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        *lock(&self.shared.on_state_change) = Some(Arc::new(callback));
    }

    /// Observe issues (decode errors, routing misses, transport errors,
    /// exhausted reconnection) in addition to the log output.
    pub fn set_on_issue<F>(&self, callback: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        *lock(&self.shared.on_issue) = Some(Arc::new(callback));
    }

    // -------------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------------

    /// Register `handler` for `event`, replacing any existing handler.
    pub fn route(&self, event: impl Into<String>, handler: impl Fn(Value) + Send + Sync + 'static) {
        self.shared.router.route(event, handler);
    }

    /// Register a handler that receives `data` decoded as `T`.
    pub fn route_typed<T, F>(&self, event: impl Into<String>, handler: F)
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.shared.router.route_typed(event, handler);
    }

    /// Remove the handler for `event`, if any.
    pub fn unroute(&self, event: &str) {
        self.shared.router.unroute(event);
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open a socket. Only acts from `Disconnected` or `Failed`.
    pub fn connect(&self) {
        tracing::info!("Connecting to {}", self.shared.url);
        self.transition(|machine| machine.connect());
    }

    /// Close the connection and cancel any pending reconnect.
    ///
    /// A reconnect timer that fires afterwards does nothing.
    pub fn close(&self) {
        self.transition(|machine| machine.close());
    }

    /// Send `data` under `event` on the open socket.
    pub fn send<T: Serialize>(&self, event: &str, data: &T) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let text = Envelope::wrap(event, data)
            .and_then(|envelope| envelope.to_text())
            .map_err(ClientError::Encode)?;
        self.shared
            .transport
            .send(text)
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    /// Decode one inbound text frame and dispatch it.
    ///
    /// Never fails: decode errors and routing misses are reported and the
    /// message is dropped.
    pub fn handle_message(&self, text: &str) {
        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!("Undecodable frame: {}", preview(text));
                self.report(&ClientError::Decode(e));
                return;
            }
        };

        let event = envelope.event.clone();
        tracing::trace!("Dispatching `{}`", event);
        if let Err(e) = self.shared.router.dispatch(envelope) {
            if matches!(e, ClientError::Decode(_)) {
                tracing::debug!("Payload for `{}` did not decode", event);
            }
            self.report(&e);
        }
    }

    // -------------------------------------------------------------------------
    // Transport and timer events
    // -------------------------------------------------------------------------

    fn on_open(&self, epoch: u64) {
        self.transition(|machine| machine.on_open(epoch));
    }

    fn on_close(&self, epoch: u64) {
        self.transition(|machine| machine.on_close(epoch));
    }

    fn on_message(&self, epoch: u64, text: &str) {
        let current = {
            let machine = self.machine();
            machine.is_current(epoch) && machine.state() == ConnectionState::Connected
        };
        if !current {
            tracing::trace!("Dropping frame from a stale socket");
            return;
        }
        self.handle_message(text);
    }

    fn on_transport_error(&self, epoch: u64, message: String) {
        if !self.machine().is_current(epoch) {
            return;
        }
        self.report(&ClientError::Transport(message));
    }

    fn on_reconnect_timer(&self, token: u64) {
        self.transition(|machine| {
            let effects = machine.on_timer(token);
            if !effects.is_empty() {
                tracing::info!(
                    "Attempting to reconnect... (Attempt {})",
                    machine.attempts()
                );
            }
            effects
        });
    }

    // -------------------------------------------------------------------------
    // Transition plumbing
    // -------------------------------------------------------------------------

    /// Apply a machine transition and execute its effects under the state lock.
    ///
    /// Observers are notified after the lock is released.
    fn transition(&self, step: impl FnOnce(&mut ConnectionMachine) -> Vec<Effect>) {
        let (before, after, issues) = {
            let mut machine = self.machine();
            let before = machine.state();
            let effects = step(&mut *machine);
            let issues = self.execute(&mut *machine, effects);
            (before, machine.state(), issues)
        };

        for issue in &issues {
            self.report(issue);
        }

        if before != after {
            tracing::info!("Connection state: {} -> {}", before, after);
            // Cloned out so the observer may call back into the manager.
            let observer = lock(&self.shared.on_state_change).clone();
            if let Some(cb) = observer {
                cb(after);
            }
        }
    }

    fn execute(&self, machine: &mut ConnectionMachine, effects: Vec<Effect>) -> Vec<ClientError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut issues = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::OpenSocket { epoch } => {
                    let events: TransportEvents = Arc::new(SocketEvents {
                        epoch,
                        shared: Arc::downgrade(&self.shared),
                    });
                    if let Err(e) = self.shared.transport.open(&self.shared.url, events) {
                        // Never got a socket: treat it like an immediate close.
                        issues.push(ClientError::Transport(e.to_string()));
                        queue.extend(machine.on_close(epoch));
                    }
                }
                Effect::CloseSocket => self.shared.transport.close(),
                Effect::ScheduleReconnect { token, delay_ms } => {
                    tracing::info!("Reconnecting in {}ms", delay_ms);
                    let shared = Arc::downgrade(&self.shared);
                    self.shared.scheduler.schedule(
                        Duration::from_millis(delay_ms),
                        Box::new(move || {
                            if let Some(shared) = shared.upgrade() {
                                ConnectionManager { shared }.on_reconnect_timer(token);
                            }
                        }),
                    );
                }
                Effect::CancelReconnect => self.shared.scheduler.cancel(),
                Effect::Exhausted { attempts } => {
                    issues.push(ClientError::ReconnectExhausted { attempts });
                }
            }
        }

        issues
    }

    fn report(&self, issue: &ClientError) {
        match issue {
            ClientError::Decode(_) | ClientError::Unhandled { .. } => {
                tracing::warn!("{}", issue)
            }
            _ => tracing::error!("{}", issue),
        }
        let observer = lock(&self.shared.on_issue).clone();
        if let Some(cb) = observer {
            cb(issue);
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.shared.url)
            .field("state", &self.state())
            .field("router", &self.shared.router)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Event sink handed to the transport for one socket.
///
/// Holds the manager weakly so a transport that outlives it does not keep it alive.
struct SocketEvents {
    epoch: u64,
    shared: Weak<Shared>,
}

impl SocketEvents {
    fn manager(&self) -> Option<ConnectionManager> {
        self.shared
            .upgrade()
            .map(|shared| ConnectionManager { shared })
    }
}

impl TransportEventSink for SocketEvents {
    fn opened(&self) {
        if let Some(manager) = self.manager() {
            manager.on_open(self.epoch);
        }
    }

    fn message(&self, text: String) {
        if let Some(manager) = self.manager() {
            manager.on_message(self.epoch, &text);
        }
    }

    fn error(&self, message: String) {
        if let Some(manager) = self.manager() {
            manager.on_transport_error(self.epoch, message);
        }
    }

    fn closed(&self) {
        if let Some(manager) = self.manager() {
            manager.on_close(self.epoch);
        }
    }
}
