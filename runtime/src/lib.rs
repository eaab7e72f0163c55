//! # Check-in Runtime
//!
//! The [`Store`] owns a page's view state, runs its reducer and executes the
//! effects the reducer returns.
//!
//! The console is a one-shot command line tool, so `send` does not hand back
//! a handle to background work: it drives every effect (and every action
//! those effects feed back) to completion before returning. Two `send` calls
//! made concurrently still race independently; whichever reload lands last
//! decides the final state.

use checkin_core::{effect::Effect, reducer::Reducer};
use futures::future::{join_all, BoxFuture};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The Store - runtime for a reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(EventosState::default(), EventosReducer::new(), env);
///
/// store.send(EventosAction::Load).await;
/// let count = store.state(|s| s.eventos().len()).await;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
        }
    }

    /// Send an action and wait until all resulting effects have finished.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) {
        self.dispatch(action).await;
    }

    /// Read state through a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Reduce one action, then execute its effects concurrently.
    ///
    /// The write lock is released before any effect runs.
    fn dispatch(&self, action: A) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };
            metrics::counter!("store.actions").increment(1);

            let running: Vec<_> = effects.into_iter().map(|e| self.execute_effect(e)).collect();
            join_all(running).await;
        })
    }

    fn execute_effect(&self, effect: Effect<A>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, feeding back");
                        self.dispatch(action).await;
                    }
                },
            }
        })
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
        }
    }
}
