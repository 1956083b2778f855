//! Integration tests for Store action broadcasting
//!
//! Multi-step request chains (create, then price, then authorize) are
//! driven through `send_and_wait_for` and observed with `subscribe_actions`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use futures::future::join_all;
use std::time::Duration;
use vibes_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use vibes_runtime::{Store, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
enum ChainAction {
    /// Start a request chain with a correlation id
    Start { id: u64 },
    /// The backend accepted the request
    Created { id: u64 },
    /// The backend priced the request
    Priced { id: u64, amount: u32 },
    /// Terminal success
    Authorized { id: u64 },
    /// Terminal failure
    Rejected { id: u64, reason: String },
}

#[derive(Debug, Clone, Default)]
struct ChainState {
    completed: Vec<u64>,
    rejected: Vec<u64>,
    total: u32,
}

#[derive(Clone)]
struct ChainEnvironment {
    latency: Duration,
}

#[derive(Clone)]
struct ChainReducer;

impl Reducer for ChainReducer {
    type State = ChainState;
    type Action = ChainAction;
    type Environment = ChainEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let latency = env.latency;
        match action {
            ChainAction::Start { id } => smallvec![Effect::future(async move {
                tokio::time::sleep(latency).await;
                Some(ChainAction::Created { id })
            })],
            ChainAction::Created { id } => smallvec![Effect::future(async move {
                tokio::time::sleep(latency).await;
                // Odd ids are priced, even ids exceed the limit
                if id % 2 == 1 {
                    Some(ChainAction::Priced { id, amount: 100 })
                } else {
                    Some(ChainAction::Rejected {
                        id,
                        reason: "over limit".to_string(),
                    })
                }
            })],
            ChainAction::Priced { id, amount } => {
                state.total += amount;
                smallvec![Effect::future(async move { Some(ChainAction::Authorized { id }) })]
            },
            ChainAction::Authorized { id } => {
                state.completed.push(id);
                SmallVec::new()
            },
            ChainAction::Rejected { id, .. } => {
                state.rejected.push(id);
                SmallVec::new()
            },
        }
    }
}

fn store(latency_ms: u64) -> Store<ChainState, ChainAction, ChainEnvironment, ChainReducer> {
    Store::new(
        ChainState::default(),
        ChainReducer,
        ChainEnvironment {
            latency: Duration::from_millis(latency_ms),
        },
    )
}

fn is_terminal(id: u64) -> impl Fn(&ChainAction) -> bool {
    move |action| {
        matches!(
            action,
            ChainAction::Authorized { id: a } | ChainAction::Rejected { id: a, .. } if *a == id
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_wait_for_terminal_action_of_chain() {
    let store = store(5);

    let result = store
        .send_and_wait_for(ChainAction::Start { id: 1 }, is_terminal(1), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(result, ChainAction::Authorized { id: 1 });
    // The terminal action is reduced before the waiter sees it
    assert_eq!(store.state(|s| s.completed.clone()).await, vec![1]);
    assert_eq!(store.state(|s| s.total).await, 100);
}

#[tokio::test]
async fn test_failure_is_a_terminal_action_too() {
    let store = store(5);

    let result = store
        .send_and_wait_for(ChainAction::Start { id: 2 }, is_terminal(2), Duration::from_secs(1))
        .await
        .unwrap();

    assert!(matches!(result, ChainAction::Rejected { id: 2, .. }));
    assert_eq!(store.state(|s| s.rejected.clone()).await, vec![2]);
}

#[tokio::test]
async fn test_concurrent_waiters_get_their_own_result() {
    let store = store(10);

    let results: Vec<ChainAction> = join_all([1_u64, 2, 3].map(|id| {
        store.send_and_wait_for(ChainAction::Start { id }, is_terminal(id), Duration::from_secs(1))
    }))
    .await
    .into_iter()
    .map(Result::unwrap)
    .collect();

    assert_eq!(results[0], ChainAction::Authorized { id: 1 });
    assert!(matches!(results[1], ChainAction::Rejected { id: 2, .. }));
    assert_eq!(results[2], ChainAction::Authorized { id: 3 });
    assert_eq!(store.state(|s| s.total).await, 200);
}

#[tokio::test]
async fn test_subscriber_sees_effect_actions_in_order() {
    let store = store(1);
    let mut rx = store.subscribe_actions();

    store.send(ChainAction::Start { id: 5 }).await.unwrap();

    let mut seen = Vec::new();
    while seen.len() < 3 {
        let action = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(action);
    }

    // The initial action is not broadcast
    assert_eq!(
        seen,
        vec![
            ChainAction::Created { id: 5 },
            ChainAction::Priced { id: 5, amount: 100 },
            ChainAction::Authorized { id: 5 },
        ]
    );
}

#[tokio::test]
async fn test_wait_times_out_when_chain_is_slow() {
    let store = store(200);

    let result = store
        .send_and_wait_for(ChainAction::Start { id: 1 }, is_terminal(1), Duration::from_millis(20))
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}
