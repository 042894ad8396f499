//! # Storefront Testing
//!
//! Testing utilities and helpers for the storefront architecture.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for the effects a reducer returns
//! - An [`EventRecorder`] that captures everything published on an event bus
//! - Test tracing setup
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::EventRecorder;
//!
//! #[tokio::test]
//! async fn test_add_to_basket() {
//!     let store = Store::new(AppState::default(), StorefrontReducer, env);
//!     let recorder = EventRecorder::attach(&store.bus(), "basket:*");
//!
//!     store.send(StoreAction::AddToBasket(id)).await?;
//!
//!     assert_eq!(recorder.keys(), vec!["basket:item-added", "basket:changed"]);
//! }
//! ```

#![allow(clippy::module_name_repetitions)]


pub use reducer_test::{assertions, ReducerTest};

/// Mock collaborators for tests.
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};
    use storefront_core::event_bus::{BusEvent, EventBus, Pattern, SubscriptionId};

    /// Captures every event published on a bus that matches a pattern
    ///
    /// The recorder clones each event as it is delivered, so the captured
    /// sequence reflects exact dispatch order (including nested publishes).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let bus = Arc::new(EventBus::new());
    /// let recorder = EventRecorder::attach(&bus, "*");
    /// bus.publish(&MyEvent::Ping);
    /// assert_eq!(recorder.keys(), vec!["ping"]);
    /// ```
    pub struct EventRecorder<E> {
        events: Arc<Mutex<Vec<E>>>,
        subscription: SubscriptionId,
    }

    impl<E> EventRecorder<E>
    where
        E: BusEvent + Clone + Send + 'static,
    {
        /// Subscribe a new recorder to `bus`
        pub fn attach<P: Into<Pattern>>(bus: &EventBus<E>, pattern: P) -> Self {
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&events);
            let subscription = bus.on(pattern, move |event: &E| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(event.clone());
            });
            Self {
                events,
                subscription,
            }
        }

        /// All captured events, in delivery order
        #[must_use]
        pub fn events(&self) -> Vec<E> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Keys of all captured events, in delivery order
        #[must_use]
        pub fn keys(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(BusEvent::key)
                .collect()
        }

        /// The most recent captured event with the given key
        #[must_use]
        pub fn last(&self, key: &str) -> Option<E> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .rev()
                .find(|event| event.key() == key)
                .cloned()
        }

        /// Forget everything captured so far
        pub fn clear(&self) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }

        /// Subscription this recorder is registered under
        #[must_use]
        pub const fn subscription(&self) -> SubscriptionId {
            self.subscription
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    /// Install a `tracing` subscriber writing to the test harness output
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use mocks::EventRecorder;

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::event_bus::{BusEvent, EventBus};

    #[derive(Clone, Debug, PartialEq)]
    enum Ping {
        A,
        B,
    }

    impl BusEvent for Ping {
        fn key(&self) -> &'static str {
            match self {
                Self::A => "ping:a",
                Self::B => "ping:b",
            }
        }
    }

    #[test]
    fn recorder_captures_matching_events_in_order() {
        init_test_tracing();
        let bus = EventBus::new();
        let all = EventRecorder::attach(&bus, "*");
        let only_b = EventRecorder::attach(&bus, "ping:b");

        bus.publish(&Ping::A);
        bus.publish(&Ping::B);
        bus.publish(&Ping::A);

        assert_eq!(all.keys(), vec!["ping:a", "ping:b", "ping:a"]);
        assert_eq!(only_b.events(), vec![Ping::B]);
        assert_eq!(all.last("ping:b"), Some(Ping::B));
    }

    #[test]
    fn recorder_clear_and_unsubscribe() {
        let bus = EventBus::new();
        let recorder = EventRecorder::attach(&bus, "ping:*");
        bus.publish(&Ping::A);
        recorder.clear();
        assert!(recorder.events().is_empty());

        assert!(bus.unsubscribe(recorder.subscription()));
        bus.publish(&Ping::B);
        assert!(recorder.events().is_empty());
    }
}
