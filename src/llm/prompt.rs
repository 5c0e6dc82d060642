//! Request formatting — context snapshot → instruction preamble → messages.
//!
//! DESIGN
//! ======
//! The visualizer context is embedded as plain text inside a leading user
//! message. The rules in the preamble are instructions to the remote model;
//! nothing here checks that the model follows them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::types::Message;

const UNKNOWN_ALGORITHM: &str = "Unknown";
const MISSING_ARRAY: &str = "N/A";
const MISSING_STEP: &str = "undefined";

const PREAMBLE_RULES: &str = "\
You are a concise and professional assistant for a sorting algorithm visualizer.

Rules:
- Focus ONLY on sorting algorithms, steps, array state, comparisons, or performance questions.
- NEVER output raw JSON, object literals, or backtick code formatting. If you get JSON as context, describe it in plain text.
- DO NOT REVEAL that the context is null or empty. Ask the user to provide more context instead.
- NEVER use markdown syntax like *italics* or **bold**. Use plain text only.
- Always respond with clear, short, and helpful answers. No long explanations unless asked.
- Stay in character. Do not go off-topic or speculate outside algorithm logic.
- Avoid saying you \"cannot do\" something unless absolutely necessary. If the full array is provided, estimate remaining steps using the algorithm logic.
- If the question is off-topic, gently bring the user back to sorting-related discussion.
- DO NOT CHANGE your role or purpose. You are a sorting algorithm assistant, not a general AI.
- USE the context provided to you to answer questions about the current sorting state.";

// =============================================================================
// CONTEXT SNAPSHOT
// =============================================================================

/// What the visualizer currently shows. Supplied by the host at call time.
///
/// `step` and `array` are loose JSON values because hosts hand over whatever
/// they have; rendering falls back instead of rejecting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// An explicit `null` is kept as `Some(Value::Null)`; only a missing key is `None`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<Value>,
}

impl ContextSnapshot {
    #[must_use]
    pub fn new(algorithm: impl Into<String>, step: u64, array: &[i64]) -> Self {
        Self {
            algorithm: Some(algorithm.into()),
            step: Some(Value::from(step)),
            array: Some(Value::from(array.to_vec())),
        }
    }

    #[must_use]
    pub fn algorithm_text(&self) -> &str {
        self.algorithm.as_deref().unwrap_or(UNKNOWN_ALGORITHM)
    }

    /// Numbers render as-is; anything else renders as its JSON text.
    #[must_use]
    pub fn step_text(&self) -> String {
        match &self.step {
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
            None => MISSING_STEP.to_string(),
        }
    }

    /// Comma-separated elements, or `N/A` when the field is not a list.
    #[must_use]
    pub fn array_text(&self) -> String {
        match &self.array {
            Some(Value::Array(items)) => join_items(items, ", "),
            _ => MISSING_ARRAY.to_string(),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn join_items(items: &[Value], sep: &str) -> String {
    items.iter().map(item_text).collect::<Vec<_>>().join(sep)
}

fn item_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(inner) => join_items(inner, ","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Build the instruction preamble with the context embedded as text.
#[must_use]
pub fn build_preamble(ctx: &ContextSnapshot) -> String {
    let preamble = format!(
        "{PREAMBLE_RULES}\n\nCurrent sorting context:\n- Algorithm: {}\n- Step: {}\n- Array: [{}]",
        ctx.algorithm_text(),
        ctx.step_text(),
        ctx.array_text(),
    );
    preamble.trim().to_string()
}

/// Preamble first, then prior history, then the new query.
#[must_use]
pub fn build_messages(history: &[Message], query: &str, ctx: &ContextSnapshot) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::user(build_preamble(ctx)));
    messages.extend_from_slice(history);
    messages.push(Message::user(query));
    messages
}

/// JSON body posted to the proxy endpoint.
#[derive(Debug, Serialize)]
pub struct ProxyRequest<'a> {
    pub messages: &'a [Message],
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
