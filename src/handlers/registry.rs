use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::{EventHandler, HandlerError};

// ============================================================================
// Handler Registry and Dispatcher
// ============================================================================

/// Result of routing one delivery to its handler.
#[derive(Debug)]
pub enum DispatchOutcome {
    Handled,
    NoHandler,
    Failed(HandlerError),
}

/// Routing-key to handler table, built once at startup and frozen behind an
/// `Arc` for the consumer loop.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        let key = handler.routing_key();
        if self.handlers.insert(key, handler).is_some() {
            warn!(routing_key = %key, "Handler replaced an earlier registration");
        }
    }

    pub fn resolve(&self, routing_key: &str) -> Option<&Arc<dyn EventHandler>> {
        self.handlers.get(routing_key)
    }

    /// Sorted so queue bindings are declared in a stable order.
    pub fn routing_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// Cheap clone handed to the consumer loop. Dispatch is pure routing; acks
/// and metrics stay with the consumer.
#[derive(Clone)]
pub struct EventDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn routing_keys(&self) -> Vec<&'static str> {
        self.registry.routing_keys()
    }

    pub async fn dispatch(&self, routing_key: &str, payload: &[u8]) -> DispatchOutcome {
        match self.registry.resolve(routing_key) {
            Some(handler) => match handler.handle(payload).await {
                Ok(()) => DispatchOutcome::Handled,
                Err(err) => DispatchOutcome::Failed(err),
            },
            None => DispatchOutcome::NoHandler,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::IsTransient;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHandler {
        key: &'static str,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn routing_key(&self) -> &'static str {
            self.key
        }

        async fn handle(&self, _payload: &[u8]) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails with a transient error until `failures_left` runs out.
    struct FlakyHandler {
        key: &'static str,
        calls: Arc<AtomicU32>,
        failures_left: AtomicU32,
    }

    #[async_trait]
    impl EventHandler for FlakyHandler {
        fn routing_key(&self) -> &'static str {
            self.key
        }

        async fn handle(&self, _payload: &[u8]) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(HandlerError::Repository(anyhow::anyhow!(
                    "database unavailable"
                )));
            }
            Ok(())
        }
    }

    fn create_test_dispatcher(handler: Arc<dyn EventHandler>) -> EventDispatcher {
        let mut registry = HandlerRegistry::new();
        registry.register(handler);
        EventDispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_known_routing_key_is_handled_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let dispatcher = create_test_dispatcher(Arc::new(CountingHandler {
            key: "user.registered",
            calls: calls.clone(),
        }));

        let outcome = dispatcher.dispatch("user.registered", b"{}").await;

        assert!(matches!(outcome, DispatchOutcome::Handled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_routing_key_has_no_handler() {
        let calls = Arc::new(AtomicU32::new(0));
        let dispatcher = create_test_dispatcher(Arc::new(CountingHandler {
            key: "user.registered",
            calls: calls.clone(),
        }));

        let outcome = dispatcher.dispatch("order.audited", b"{}").await;

        assert!(matches!(outcome, DispatchOutcome::NoHandler));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_surfaces_as_failed() {
        let dispatcher = create_test_dispatcher(Arc::new(FlakyHandler {
            key: "user.registered",
            calls: Arc::new(AtomicU32::new(0)),
            failures_left: AtomicU32::new(u32::MAX),
        }));

        let outcome = dispatcher.dispatch("user.registered", b"{}").await;

        match outcome {
            DispatchOutcome::Failed(err) => assert!(err.is_transient()),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    /// Drives a requeue loop the way the consumer does: failed deliveries go
    /// back on the queue and come around again until they succeed.
    #[tokio::test]
    async fn test_requeued_delivery_succeeds_on_redelivery() {
        let calls = Arc::new(AtomicU32::new(0));
        let dispatcher = create_test_dispatcher(Arc::new(FlakyHandler {
            key: "user.registered",
            calls: calls.clone(),
            failures_left: AtomicU32::new(1),
        }));

        let mut queue: VecDeque<Vec<u8>> = VecDeque::new();
        queue.push_back(b"{}".to_vec());

        let mut redeliveries = 0;
        while let Some(payload) = queue.pop_front() {
            match dispatcher.dispatch("user.registered", &payload).await {
                DispatchOutcome::Handled => {}
                DispatchOutcome::Failed(err) if err.is_transient() => {
                    redeliveries += 1;
                    queue.push_back(payload);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }

        assert_eq!(redeliveries, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_routing_keys_are_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(CountingHandler {
            key: "user.registered",
            calls: Arc::new(AtomicU32::new(0)),
        }));
        registry.register(Arc::new(CountingHandler {
            key: "user.logged-in",
            calls: Arc::new(AtomicU32::new(0)),
        }));

        assert_eq!(
            registry.routing_keys(),
            vec!["user.logged-in", "user.registered"]
        );
    }

    #[test]
    fn test_registering_same_key_replaces_handler() {
        let first_calls = Arc::new(AtomicU32::new(0));
        let second_calls = Arc::new(AtomicU32::new(0));

        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(CountingHandler {
            key: "user.registered",
            calls: first_calls,
        }));
        registry.register(Arc::new(CountingHandler {
            key: "user.registered",
            calls: second_calls,
        }));

        assert_eq!(registry.routing_keys().len(), 1);
    }
}
