//! SortVision assistant and leaderboard core.
//!
//! - [`llm`]: request formatting and the assistant proxy client.
//! - [`services`]: conversation session, reveal animation, history store,
//!   and the chat panel that ties them together.
//! - [`state`]: chat display buffer.
//! - [`leaderboard`]: contributor row rendering and issue-search links.

pub mod leaderboard;
pub mod llm;
pub mod services;
pub mod state;
