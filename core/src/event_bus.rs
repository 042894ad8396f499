//! Event bus for coordinating views around a single state container.
//!
//! This module provides the [`EventBus`], a synchronous publish/subscribe
//! dispatcher parameterized by a closed event enum. The reducer describes
//! publications as [`Effect::Publish`](crate::effect::Effect::Publish) values and
//! the runtime hands them to the bus once the state lock is released, so every
//! subscriber observes the state that produced the event.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    Action    │◄──────────── view intent / network result
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Reducer    │
//! └──────┬───────┘
//!        │ Effect::Publish(event)
//!        ▼
//! ┌──────────────┐
//! │  Event Bus   │◄─── synchronous, registration order
//! └──────┬───────┘
//!        │
//!   ┌────┴─────┬──────────┐
//!   ▼          ▼          ▼
//! ┌──────┐ ┌───────┐ ┌────────┐
//! │ Page │ │ Modal │ │ Basket │
//! └──────┘ └───────┘ └────────┘
//! ```
//!
//! # Key Principles
//!
//! - **Typed events**: every event is a variant of one enum implementing [`BusEvent`]
//! - **Synchronous dispatch**: `publish` returns after every matching handler ran
//! - **Registration order**: handlers run in the order they subscribed
//! - **Isolation**: a handler that fails or panics is logged and skipped; its
//!   siblings still receive the event
//! - **Re-entrancy**: handlers may subscribe or publish while being dispatched;
//!   a nested publish completes depth first
//!
//! # Key Patterns
//!
//! Keys follow the `{area}:{what}` convention (`catalog:updated`, `modal:open`).
//! Subscriptions use a [`Pattern`]:
//! - `"modal:open"` - exact key
//! - `"basket:*"` - every key with the `basket:` prefix
//! - `"*"` - every key
//! - [`Pattern::regex`] - a compiled regular expression
//!
//! # Example
//!
//! ```
//! use storefront_core::event_bus::{BusEvent, EventBus};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Debug)]
//! enum UiEvent { ModalOpened, ModalClosed }
//!
//! impl BusEvent for UiEvent {
//!     fn key(&self) -> &'static str {
//!         match self {
//!             Self::ModalOpened => "modal:open",
//!             Self::ModalClosed => "modal:close",
//!         }
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! bus.on("modal:*", move |_event: &UiEvent| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.publish(&UiEvent::ModalOpened);
//! bus.publish(&UiEvent::ModalClosed);
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```

use regex::Regex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors that can occur while configuring the event bus.
#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    /// A regex subscription pattern failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source
        pattern: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Failure reported by a subscriber while handling an event.
///
/// The bus logs it and moves on to the next subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    /// Create a handler error with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// An event that can travel on the [`EventBus`].
pub trait BusEvent {
    /// The routing key subscribers match against (e.g. `"catalog:updated"`)
    fn key(&self) -> &'static str;
}

/// Key pattern a subscription matches against.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Every key
    Any,
    /// Exactly this key
    Exact(String),
    /// Every key starting with this prefix
    Prefix(String),
    /// Every key the expression matches
    Regex(Regex),
}

impl Pattern {
    /// Match a single key exactly
    #[must_use]
    pub fn exact(key: impl Into<String>) -> Self {
        Self::Exact(key.into())
    }

    /// Match every key starting with `prefix`
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Compile a regular-expression pattern
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::InvalidPattern`] if the expression does not compile.
    pub fn regex(expression: &str) -> Result<Self, EventBusError> {
        Regex::new(expression)
            .map(Self::Regex)
            .map_err(|e| EventBusError::InvalidPattern {
                pattern: expression.to_string(),
                reason: e.to_string(),
            })
    }

    /// Whether `key` is matched by this pattern
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == key,
            Self::Prefix(prefix) => key.starts_with(prefix.as_str()),
            Self::Regex(regex) => regex.is_match(key),
        }
    }
}

impl From<&str> for Pattern {
    /// `"*"` matches everything, a trailing `*` makes a prefix pattern,
    /// anything else is an exact key.
    fn from(value: &str) -> Self {
        if value == "*" {
            Self::Any
        } else if let Some(prefix) = value.strip_suffix('*') {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(value.to_string())
        }
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(key) => write!(f, "{key}"),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Subscriber callback.
pub type Handler<E> = Arc<dyn Fn(&E) -> Result<(), HandlerError> + Send + Sync>;

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber<E> {
    id: SubscriptionId,
    pattern: Pattern,
    handler: Handler<E>,
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            pattern: self.pattern.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Outcome of a single [`EventBus::publish`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that completed successfully
    pub delivered: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
}

impl DispatchReport {
    /// Whether no handler failed
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Total number of handlers the event was routed to
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Synchronous, typed publish/subscribe dispatcher.
///
/// # Thread Safety
///
/// The bus is `Send + Sync` so it can be shared between the store and the
/// tasks that execute effects. The subscriber list is snapshotted before each
/// dispatch; the lock is never held while a handler runs.
pub struct EventBus<E> {
    subscribers: RwLock<Vec<Subscriber<E>>>,
    next_id: AtomicU64,
}

impl<E> EventBus<E> {
    /// Create an empty bus
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Remove a subscription
    ///
    /// Returns `false` if the id was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::trace!(subscription = id.0, "Unsubscribed handler");
        }
        removed
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Register a fallible handler for every key matching `pattern`
    pub fn subscribe<P, F>(&self, pattern: P, handler: F) -> SubscriptionId
    where
        P: Into<Pattern>,
        F: Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let pattern = pattern.into();
        tracing::trace!(subscription = id.0, pattern = %pattern, "Subscribed handler");

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                pattern,
                handler: Arc::new(handler),
            });
        id
    }

    /// Register an infallible handler for every key matching `pattern`
    pub fn on<P, F>(&self, pattern: P, handler: F) -> SubscriptionId
    where
        P: Into<Pattern>,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(pattern, move |event| {
            handler(event);
            Ok(())
        })
    }

    /// Deliver `event` to every subscriber whose pattern matches its key
    ///
    /// Handlers run synchronously, in registration order. A handler that
    /// returns an error or panics is logged and counted in the report; the
    /// remaining handlers still run.
    pub fn publish(&self, event: &E) -> DispatchReport {
        let key = event.key();
        let matching: Vec<Subscriber<E>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.pattern.matches(key))
            .cloned()
            .collect();

        let mut report = DispatchReport::default();
        if matching.is_empty() {
            tracing::trace!(key, "Published event with no subscribers");
            return report;
        }

        tracing::trace!(key, handlers = matching.len(), "Publishing event");
        for subscriber in matching {
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscriber.handler)(event)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(error)) => {
                    report.failed += 1;
                    metrics::counter!("event_bus.handler.failed", "key" => key).increment(1);
                    tracing::warn!(
                        key,
                        subscription = subscriber.id.0,
                        error = %error,
                        "Event handler failed"
                    );
                },
                Err(payload) => {
                    report.failed += 1;
                    metrics::counter!("event_bus.handler.failed", "key" => key).increment(1);
                    tracing::error!(
                        key,
                        subscription = subscriber.id.0,
                        panic = panic_message(payload.as_ref()),
                        "Event handler panicked"
                    );
                },
            }
        }
        report
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
