// src/chat_session.rs
use crate::assistant::prompts;
use crate::models::chat::{ChatRole, ChatTurn};
use crate::models::property::PropertyRecord;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const GREETING_ID: &str = "welcome";

/// Append-only transcript for one viewed property. Turn timestamps never go
/// backwards, even if the wall clock does.
#[derive(Debug, Clone)]
pub struct ChatSession {
    property_id: String,
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    /// Fresh transcript holding only the assistant's greeting.
    pub fn for_property(property: &PropertyRecord) -> Self {
        Self {
            property_id: property.id.clone(),
            turns: vec![ChatTurn {
                id: GREETING_ID.to_string(),
                role: ChatRole::Assistant,
                text: prompts::greeting(property),
                created_at: Utc::now(),
            }],
        }
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn append(&mut self, role: ChatRole, text: impl Into<String>) -> &ChatTurn {
        let created_at = self.next_timestamp(Utc::now());
        self.turns.push(ChatTurn {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at,
        });
        &self.turns[self.turns.len() - 1]
    }

    fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.turns.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        }
    }
}
