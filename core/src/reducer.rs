//! The `Reducer` trait: where the console's business rules live.

use crate::effect::Effect;
use smallvec::SmallVec;

/// Pure state transition function for one console page.
///
/// # Type Parameters
///
/// - `State`: the view state this reducer operates on
/// - `Action`: user intents and backend outcomes
/// - `Environment`: injected dependencies (gateway, clock)
///
/// A reducer validates the action, updates `state` in place and returns the
/// effects the runtime must execute. Effects may feed new actions back into
/// the same reducer (for example `Reload` after a successful ticket sweep).
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
