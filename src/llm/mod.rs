//! LLM — assistant proxy adapter for the sorting chat assistant.
//!
//! DESIGN
//! ======
//! The remote model sits behind a same-origin proxy (`/api/gemini`) that owns
//! the provider key. `ProxyClient` is constructed explicitly from an
//! `AssistantConfig` and handed to the session as `Arc<dyn AssistantChat>`;
//! there is no process-wide client. Prompt construction lives in `prompt`
//! as pure functions so it can be tested without a network.

pub mod config;
pub mod prompt;
pub mod proxy;
pub mod types;

pub use config::AssistantConfig;
pub use prompt::{ContextSnapshot, build_messages, build_preamble};
pub use proxy::ProxyClient;
pub use types::{AssistantChat, AssistantError, FailureKind, Message, Role};
