//! Chat session management
//!
//! Holds the single conversation the assistant keeps with the model. The
//! session is created on the first chat turn and dropped wholesale on reset;
//! the next turn after a reset starts over with an empty history.

pub mod store;

pub use store::{ChatSession, ChatSessionSlot};
