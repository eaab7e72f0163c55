//! Side effect descriptions.
//!
//! Effects are values returned by reducers. They are not executed until the
//! runtime `Store` picks them up, so a reducer test can inspect exactly which
//! backend calls an action would trigger.

use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by [`Effect::Future`].
pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

/// Effect type - describes a side effect to be executed
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Arbitrary async computation, usually one backend request.
    ///
    /// If the future resolves to `Some(action)`, the action is fed back into
    /// the reducer.
    Future(EffectFuture<Action>),
}

// Manual Debug implementation since Future doesn't implement Debug
impl<Action> std::fmt::Debug for Effect<Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
        }
    }
}

impl<Action: Send + 'static> Effect<Action> {
    /// Wrap an async computation that may produce a follow-up action.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(fut))
    }

    /// Lift an effect of a child reducer into the parent's action type.
    ///
    /// Used when a page reducer embeds a generic reducer (the event page
    /// embeds the CRUD reducer for `Evento`).
    #[must_use]
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: FnOnce(Action) -> B + Send + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Future(fut) => Effect::Future(Box::pin(fut.map(move |a| a.map(f)))),
        }
    }
}

impl<Action> Effect<Action> {
    /// Whether this effect does nothing at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }
}
