//! # Check-in Core
//!
//! Core traits and types shared by the check-in console crates.
//!
//! Every page of the console (events, participants, snacks) is modelled as a
//! reducer over a small piece of view state:
//!
//! - **State**: the list currently shown plus pending notifications
//! - **Action**: user intents (`GenerateTickets`) and backend outcomes
//!   (`TicketsGenerated`)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of a backend call, executed by the runtime
//! - **Environment**: injected dependencies (gateway, clock)
//!
//! Reducers never perform I/O themselves, which keeps the ticket workflow
//! rules testable without a backend.
//!
//! ## Example
//!
//! ```
//! use checkin_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Default)]
//! struct Counter {
//!     reloads: u32,
//! }
//!
//! enum CounterAction {
//!     Reload,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = Counter;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Counter,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Reload => state.reloads += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = Counter::default();
//! let effects = CounterReducer.reduce(&mut state, CounterAction::Reload, &());
//! assert!(effects.is_empty());
//! assert_eq!(state.reloads, 1);
//! ```

pub mod effect;
pub mod environment;
pub mod reducer;

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use effect::Effect;
pub use environment::{Clock, SystemClock};
pub use reducer::Reducer;
pub use smallvec::{smallvec, SmallVec};
