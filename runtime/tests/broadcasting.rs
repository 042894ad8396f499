//! Integration tests for Store action broadcasting and event publication
//!
//! Exercises the feedback loop the storefront relies on: async effects feed
//! actions back, published events reach bus subscribers, and subscribers
//! queue follow-up actions through a dispatcher.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use storefront_core::event_bus::BusEvent;
use storefront_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use storefront_runtime::{dispatch, Store, StoreError};
use storefront_testing::{init_test_tracing, EventRecorder};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start a three-step flow
    Start { id: u64 },
    /// Flow step completed
    StepCompleted { id: u64, step: u32 },
    /// Flow finished (terminal action)
    Finished { id: u64 },
    /// A view asked to acknowledge a step
    Acknowledge { step: u32 },
}

#[derive(Debug, Clone, PartialEq)]
enum TestEvent {
    Step { step: u32 },
    Done { id: u64 },
    Acknowledged { step: u32 },
}

impl BusEvent for TestEvent {
    fn key(&self) -> &'static str {
        match self {
            Self::Step { .. } => "flow:step",
            Self::Done { .. } => "flow:done",
            Self::Acknowledged { .. } => "view:acknowledged",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TestState {
    steps: Vec<u32>,
    acknowledged: Vec<u32>,
}

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Event = TestEvent;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action, Self::Event>; 4]> {
        match action {
            TestAction::Start { id } => {
                state.steps.clear();
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(TestAction::StepCompleted { id, step: 1 })
                }))]
            },
            TestAction::StepCompleted { id, step } => {
                state.steps.push(step);
                let next = if step < 3 {
                    Effect::Future(Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(TestAction::StepCompleted { id, step: step + 1 })
                    }))
                } else {
                    Effect::Future(Box::pin(async move { Some(TestAction::Finished { id }) }))
                };
                smallvec![Effect::Publish(TestEvent::Step { step }), next]
            },
            TestAction::Finished { id } => smallvec![Effect::Publish(TestEvent::Done { id })],
            TestAction::Acknowledge { step } => {
                state.acknowledged.push(step);
                smallvec![Effect::Publish(TestEvent::Acknowledged { step })]
            },
        }
    }
}

fn store() -> Store<TestState, TestAction, TestEvent, (), TestReducer> {
    init_test_tracing();
    Store::new(TestState::default(), TestReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_and_wait_for_terminal_action() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Start { id: 7 },
            |a| matches!(a, TestAction::Finished { .. }),
            Duration::from_secs(2),
        )
        .await
        .unwrap();

    assert_eq!(result, TestAction::Finished { id: 7 });
}

#[tokio::test]
async fn send_and_wait_for_times_out() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Acknowledge { step: 1 },
            |a| matches!(a, TestAction::Finished { .. }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn effect_handle_covers_feedback_chain() {
    let store = store();
    let recorder = EventRecorder::attach(&store.bus(), "flow:*");

    let mut handle = store.send(TestAction::Start { id: 1 }).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(2)).await.unwrap();

    assert_eq!(store.state(|s| s.steps.clone()).await, vec![1, 2, 3]);
    assert_eq!(
        recorder.events(),
        vec![
            TestEvent::Step { step: 1 },
            TestEvent::Step { step: 2 },
            TestEvent::Step { step: 3 },
            TestEvent::Done { id: 1 },
        ]
    );
}

#[tokio::test]
async fn subscribe_actions_observes_feedback() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Start { id: 2 }).await.unwrap();
    handle.wait().await;

    let mut observed = Vec::new();
    while let Ok(action) = rx.try_recv() {
        observed.push(action);
    }
    assert_eq!(observed.len(), 4);
    assert_eq!(observed.last(), Some(&TestAction::Finished { id: 2 }));
}

#[tokio::test]
async fn subscriber_queues_follow_up_through_dispatcher() {
    let store = store();
    let (dispatcher, mut inbox) = dispatch::channel();
    let recorder = EventRecorder::attach(&store.bus(), "*");

    store.bus().on("flow:step", move |event: &TestEvent| {
        if let TestEvent::Step { step } = event {
            dispatcher.dispatch(TestAction::Acknowledge { step: *step });
        }
    });

    let mut handle = store.send(TestAction::Start { id: 3 }).await.unwrap();
    handle.wait().await;
    let processed = store.drain(&mut inbox).await.unwrap();

    assert_eq!(processed, 3);
    assert_eq!(store.state(|s| s.acknowledged.clone()).await, vec![1, 2, 3]);
    assert_eq!(
        recorder.keys().iter().filter(|k| **k == "view:acknowledged").count(),
        3
    );
}

#[tokio::test]
async fn shutdown_waits_for_pending_effects() {
    let store = store();
    store.send(TestAction::Start { id: 4 }).await.unwrap();
    assert!(store.pending_effects() > 0);

    store.shutdown(Duration::from_secs(2)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert!(matches!(
        store.send(TestAction::Start { id: 5 }).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
