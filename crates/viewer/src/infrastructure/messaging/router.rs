//! Event Router for inbound envelopes.
//!
//! Maps an event name to a single handler. Registering a handler for a name
//! that already has one replaces it. Dispatch is a lookup followed by a
//! synchronous call; nothing is queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

use microbiome_protocol::Envelope;

use crate::error::ClientError;

/// Handler invoked with the `data` of a matching envelope.
pub type Handler = Arc<dyn Fn(Value) -> Result<(), ClientError> + Send + Sync + 'static>;

/// Event router.
///
/// Cloning yields another handle to the same table. The table lock is released
/// before a handler runs, so a handler may route, unroute or dispatch on the
/// same router; it sees the table as it is at that moment.
#[derive(Clone, Default)]
pub struct EventRouter {
    handlers: Arc<Mutex<HashMap<String, Handler>>>,
}

impl EventRouter {
    /// Create a router with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Handler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` for `event`, replacing any existing handler.
    pub fn route(&self, event: impl Into<String>, handler: impl Fn(Value) + Send + Sync + 'static) {
        self.route_fallible(event, move |data| {
            handler(data);
            Ok(())
        });
    }

    /// Register a handler whose failures are reported by the caller of `dispatch`.
    pub fn route_fallible(
        &self,
        event: impl Into<String>,
        handler: impl Fn(Value) -> Result<(), ClientError> + Send + Sync + 'static,
    ) {
        let event = event.into();
        if self.table().insert(event.clone(), Arc::new(handler)).is_some() {
            tracing::debug!("Replaced handler for event `{}`", event);
        }
    }

    /// Register a handler that receives `data` decoded as `T`.
    ///
    /// Payloads that do not decode are reported as [`ClientError::Decode`].
    pub fn route_typed<T, F>(&self, event: impl Into<String>, handler: F)
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.route_fallible(event, move |data| {
            let payload = T::deserialize(data)?;
            handler(payload);
            Ok(())
        });
    }

    /// Remove the handler for `event`. Removing an absent handler is a no-op.
    pub fn unroute(&self, event: &str) {
        self.table().remove(event);
    }

    pub fn contains(&self, event: &str) -> bool {
        self.table().contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.table().clear();
    }

    /// Invoke the handler registered for `envelope.event` with its data.
    ///
    /// Returns [`ClientError::Unhandled`] when no handler is registered.
    pub fn dispatch(&self, envelope: Envelope) -> Result<(), ClientError> {
        let handler = self.table().get(&envelope.event).cloned();
        match handler {
            Some(handler) => handler(envelope.data),
            None => Err(ClientError::Unhandled {
                event: envelope.event,
            }),
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<String> = self.table().keys().cloned().collect();
        events.sort();
        f.debug_struct("EventRouter").field("events", &events).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    use microbiome_protocol::FrameData;

    #[test]
    fn test_route_and_dispatch() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        router.route("state", move |data| {
            seen_clone.lock().expect("lock").push(data);
        });

        router
            .dispatch(Envelope::new("state", json!({"n": 1})))
            .expect("handled");

        assert_eq!(*seen.lock().expect("lock"), vec![json!({"n": 1})]);
    }

    #[test]
    fn test_last_registration_wins() {
        let router = EventRouter::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        let first_clone = Arc::clone(&first);
        router.route("state", move |_| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = Arc::clone(&second);
        router.route("state", move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        router
            .dispatch(Envelope::new("state", Value::Null))
            .expect("handled");

        assert_eq!(router.len(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unroute_reports_unhandled() {
        let router = EventRouter::new();
        router.route("state", |_| {});
        router.unroute("state");
        router.unroute("state");

        let err = router
            .dispatch(Envelope::new("state", Value::Null))
            .expect_err("no handler left");
        assert!(matches!(err, ClientError::Unhandled { event } if event == "state"));
        assert!(router.is_empty());
    }

    #[test]
    fn test_clear_removes_every_handler() {
        let router = EventRouter::new();
        router.route("state", |_| {});
        router.route("stats", |_| {});
        assert_eq!(router.len(), 2);

        router.clear();

        assert!(router.is_empty());
        assert!(matches!(
            router.dispatch(Envelope::new("stats", Value::Null)),
            Err(ClientError::Unhandled { .. })
        ));
    }

    #[test]
    fn test_typed_route_decodes_payload() {
        let router = EventRouter::new();
        let npcs = Arc::new(AtomicU32::new(0));

        let npcs_clone = Arc::clone(&npcs);
        router.route_typed("state", move |frame: FrameData| {
            npcs_clone.store(frame.npcs.len() as u32, Ordering::SeqCst);
        });

        let frame = json!({
            "npcs": [{ "pos": [1.0, 1.0], "radius": 3.0, "color": "red" }],
            "food": [],
        });
        router
            .dispatch(Envelope::new("state", frame))
            .expect("handled");
        assert_eq!(npcs.load(Ordering::SeqCst), 1);

        let err = router
            .dispatch(Envelope::new("state", json!({"npcs": "nope"})))
            .expect_err("bad payload");
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_handler_can_reenter_router() {
        let router = EventRouter::new();
        let calls = Arc::new(AtomicU32::new(0));

        let inner_router = router.clone();
        let calls_clone = Arc::clone(&calls);
        router.route("once", move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            // Removing itself mid-call must not deadlock.
            inner_router.unroute("once");
            let _ = inner_router.dispatch(Envelope::new("once", Value::Null));
        });

        router
            .dispatch(Envelope::new("once", Value::Null))
            .expect("handled");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!router.contains("once"));
    }
}
