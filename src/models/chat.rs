// src/models/chat.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Role name expected by the Gemini `contents` array.
    pub fn as_gemini_role(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// How an assistant answer was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    /// Text came from the generation service.
    Live,
    /// No credential configured; text was built locally.
    Demo,
    /// The service failed or returned nothing; text is a fixed notice.
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl AssistantReply {
    pub fn live(text: String) -> Self {
        Self { text, outcome: ReplyOutcome::Live }
    }

    pub fn demo(text: String) -> Self {
        Self { text, outcome: ReplyOutcome::Demo }
    }

    pub fn unavailable(text: &str) -> Self {
        Self {
            text: text.to_string(),
            outcome: ReplyOutcome::Unavailable,
        }
    }
}
