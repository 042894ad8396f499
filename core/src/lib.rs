//! # Storefront Core
//!
//! Core traits and types for the storefront architecture.
//!
//! This crate provides the fundamental abstractions the storefront is built on:
//! a reducer that owns all business logic, effect descriptions that the runtime
//! executes, and a typed, synchronous event bus that views subscribe to.
//!
//! ## Core Concepts
//!
//! - **State**: The single application state for a feature
//! - **Action**: All possible inputs to a reducer (user intents and network results)
//! - **Event**: Facts published to view subscribers after a state change
//! - **Reducer**: Function `(State, Action, Environment) → Effects`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O, no hidden publishing)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::*;
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction { Increment }
//!
//! #[derive(Clone, Debug)]
//! enum CounterEvent { Changed { value: u32 } }
//!
//! impl Reducer for CounterReducer {
//!     type State = u32;
//!     type Action = CounterAction;
//!     type Event = CounterEvent;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut u32,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction, CounterEvent>; 4]> {
//!         *state += 1;
//!         smallvec![Effect::Publish(CounterEvent::Changed { value: *state })]
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Typed publish/subscribe dispatcher for view coordination
pub mod event_bus;

/// Reducer module - The core trait for business logic
///
/// Reducers are functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Event`: The event type this reducer publishes to subscribers
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for BasketReducer {
    ///     type State = BasketState;
    ///     type Action = BasketAction;
    ///     type Event = BasketEvent;
    ///     type Environment = BasketEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut BasketState,
    ///         action: BasketAction,
    ///         env: &BasketEnvironment,
    ///     ) -> SmallVec<[Effect<BasketAction, BasketEvent>; 4]> {
    ///         match action {
    ///             BasketAction::Add { id } => {
    ///                 state.items.push(id.clone());
    ///                 smallvec![Effect::Publish(BasketEvent::Added { id })]
    ///             }
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The event type published through [`Effect::Publish`]
        type Event;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This function:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// A vector of effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action, Self::Event>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    /// - `Event`: The event type that effects can publish on the event bus
    pub enum Effect<Action, Event> {
        /// No-op effect
        None,

        /// Publish an event to every matching bus subscriber
        ///
        /// Publishing is synchronous: all subscribers have run by the time
        /// the store's `send` returns.
        Publish(Event),

        /// Run effects in parallel
        Parallel(Vec<Effect<Action, Event>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action, Event>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action, Event> std::fmt::Debug for Effect<Action, Event>
    where
        Action: std::fmt::Debug,
        Event: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Publish(event) => f.debug_tuple("Effect::Publish").field(event).finish(),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action, Event> Effect<Action, Event> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action, Event>>) -> Effect<Action, Event> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action, Event>>) -> Effect<Action, Event> {
            Effect::Sequential(effects)
        }

        /// Collect every event this effect tree publishes, depth first
        ///
        /// `Future` effects are opaque and contribute nothing.
        #[must_use]
        pub fn published(&self) -> Vec<&Event> {
            let mut events = Vec::new();
            self.collect_published(&mut events);
            events
        }

        fn collect_published<'a>(&'a self, out: &mut Vec<&'a Event>) {
            match self {
                Effect::Publish(event) => out.push(event),
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    for effect in effects {
                        effect.collect_published(out);
                    }
                },
                Effect::None | Effect::Future(_) => {},
            }
        }
    }
}
