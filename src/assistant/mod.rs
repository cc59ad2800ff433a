//! Property assistant: turns a question or a report request about one listing
//! into a single answer from the generation service, or a local demo answer
//! when no key is configured. Never returns an error to the caller.

pub mod credentials;
pub mod prompts;

use crate::gemini_client::{Content, GenerateContentRequest, GenerationBackend, GenerationConfig};
use crate::models::chat::{AssistantReply, ChatTurn};
use crate::models::property::PropertyRecord;
use credentials::CredentialSource;
use std::sync::Arc;

pub const CHAT_EMPTY_REPLY: &str = "I couldn't generate a response at this time.";
pub const CHAT_UNAVAILABLE: &str =
    "I'm having trouble connecting to the Homeward secure server right now. Please try again later.";
pub const REPORT_EMPTY_REPLY: &str = "Report generation failed.";
pub const REPORT_UNAVAILABLE: &str = "Unable to generate report at this time. Please try again later.";

pub struct PropertyAssistant {
    backend: Arc<dyn GenerationBackend>,
    credentials: Arc<dyn CredentialSource>,
    model: String,
}

impl PropertyAssistant {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        credentials: Arc<dyn CredentialSource>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            credentials,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_live(&self) -> bool {
        self.credentials.api_key().is_some()
    }

    /// Answer `question` about `property`. `prior_turns` is the transcript
    /// so far, not including `question`.
    pub async fn ask_about_property(
        &self,
        property: &PropertyRecord,
        question: &str,
        prior_turns: &[ChatTurn],
    ) -> AssistantReply {
        let api_key = match self.credentials.api_key() {
            Some(key) => key,
            None => {
                tracing::debug!(property_id = %property.id, "no API key configured, answering in demo mode");
                return AssistantReply::demo(prompts::demo_chat_reply(property));
            }
        };

        let mut contents: Vec<Content> = prior_turns
            .iter()
            .map(|turn| Content::text(Some(turn.role.as_gemini_role()), turn.text.clone()))
            .collect();
        contents.push(Content::text(Some("user"), question));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(None, prompts::chat_briefing(property))),
            generation_config: Some(GenerationConfig {
                temperature: 0.4,
                top_k: 40,
                top_p: 0.9,
                max_output_tokens: 1024,
            }),
        };

        tracing::info!(
            property_id = %property.id,
            prior_turns = prior_turns.len(),
            "asking assistant about property"
        );

        match self.backend.generate(&api_key, &self.model, &request).await {
            Ok(text) => finish(text, CHAT_EMPTY_REPLY),
            Err(e) => {
                tracing::error!(property_id = %property.id, error = %e, "Gemini chat request failed");
                AssistantReply::unavailable(CHAT_UNAVAILABLE)
            }
        }
    }

    /// Four-section Markdown investment report, generated in one shot.
    pub async fn generate_investment_report(&self, property: &PropertyRecord) -> AssistantReply {
        let api_key = match self.credentials.api_key() {
            Some(key) => key,
            None => {
                tracing::debug!(property_id = %property.id, "no API key configured, building demo report");
                return AssistantReply::demo(prompts::demo_report(property));
            }
        };

        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompts::report_prompt(property))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: 0.3,
                top_k: 40,
                top_p: 0.9,
                max_output_tokens: 2048,
            }),
        };

        tracing::info!(property_id = %property.id, "generating investment report");

        match self.backend.generate(&api_key, &self.model, &request).await {
            Ok(text) => finish(text, REPORT_EMPTY_REPLY),
            Err(e) => {
                tracing::error!(property_id = %property.id, error = %e, "Gemini report request failed");
                AssistantReply::unavailable(REPORT_UNAVAILABLE)
            }
        }
    }
}

fn finish(text: String, empty_notice: &str) -> AssistantReply {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::warn!("Gemini returned an empty reply");
        AssistantReply::unavailable(empty_notice)
    } else {
        AssistantReply::live(trimmed.to_string())
    }
}
