//! Session dialogue engine
//!
//! A per-session state machine over the nodes in [`Node`]. Handlers produce
//! new states, routers decide automatic transitions, and [`ChatSession`]
//! drives both for one conversation.

mod error;
pub mod handlers;
pub mod messages;
pub mod navigation;
pub mod router;
mod session;
pub mod state;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod testing;

pub use error::ChatError;
pub use session::{ChatSession, SessionStats};
pub use state::Message;
