//! Turn controller
//!
//! Elm-style: a pure [`transition`] function decides what happens next and an
//! executor ([`TurnController`]) performs the resulting effects.
//!
//! ```text
//! Start -> Decision -> ToolDispatch -> ToolExecuted -> Synthesis -> Done
//!              |             |                             |
//!              +-> Done      +-> Failed                    +-> Failed
//!              +-> Failed
//! ```

mod effect;
mod error;
pub mod event;
mod executor;
mod state;
mod transition;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use effect::Effect;
pub use error::{TurnError, TurnErrorKind};
pub use event::Event;
pub use executor::{DebugInfo, TurnController, TurnOutcome};
pub use state::TurnState;
pub use transition::{transition, TransitionError, TransitionResult};
