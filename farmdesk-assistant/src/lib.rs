//! Farm assistant for farmdesk.
//!
//! Builds a text briefing from a [`FarmSnapshot`](farmdesk_types::FarmSnapshot)
//! and forwards it, with the conversation so far, to a language model.
//! The assistant only ever reads snapshots.

mod briefing;
mod chat;
mod error;
mod gemini;

pub use briefing::{build_briefing, grouped, system_instruction, RECENT_ORDERS};
pub use chat::{
    ask_or_apologize, Assistant, ChatRole, ChatTurn, CONNECTION_ERROR, EMPTY_ANSWER,
    INSIGHTS_QUESTION,
};
pub use error::{AssistantError, AssistantResult};
pub use gemini::{GeminiAssistant, GeminiConfig};
