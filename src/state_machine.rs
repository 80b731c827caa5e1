//! Request coordinator state machine
//!
//! Elm-style: a pure `transition` maps state + event to a new state and a list
//! of effects. The runtime performs the effects.

mod effect;
mod event;
mod state;
mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{ChatState, Status};
pub use transition::{transition, TransitionError, TransitionResult, TRANSPORT_ERROR_PREFIX};
