//! Conversation types and the assistant seam.

use crate::error::AssistantResult;
use async_trait::async_trait;
use farmdesk_types::FarmSnapshot;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Returned when the model produced no text.
pub const EMPTY_ANSWER: &str = "I'm sorry, I couldn't process that request.";

/// Returned by [`ask_or_apologize`] when the request itself failed.
pub const CONNECTION_ERROR: &str =
    "I encountered an error connecting to the intelligence server. Please try again in a moment.";

/// Canned question for a one-shot farm health summary.
pub const INSIGHTS_QUESTION: &str =
    "Provide a brief summary and financial health verdict of my farm operations.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Answers questions about the farm from a read-only snapshot.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Asks `question` after the prior `history`, grounded in `snapshot`.
    async fn ask(
        &self,
        snapshot: &FarmSnapshot,
        history: &[ChatTurn],
        question: &str,
    ) -> AssistantResult<String>;
}

/// Like [`Assistant::ask`], but any failure becomes [`CONNECTION_ERROR`]
/// so the caller always has something to show.
pub async fn ask_or_apologize(
    assistant: &dyn Assistant,
    snapshot: &FarmSnapshot,
    history: &[ChatTurn],
    question: &str,
) -> String {
    match assistant.ask(snapshot, history, question).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "assistant request failed");
            CONNECTION_ERROR.to_string()
        }
    }
}
