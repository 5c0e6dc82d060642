//! Assistant services used by the chat front end.
//!
//! ARCHITECTURE
//! ============
//! `session` talks to the model and keeps the conversation, `reveal` plays a
//! finished reply out over time, `history` stores completed exchanges, and
//! `chat` wires the three together behind a single `handle_send`.

pub mod chat;
pub mod history;
pub mod reveal;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
