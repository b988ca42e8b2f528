use std::sync::Arc;

use crate::config::Config;
use crate::history::{ChatMessage, ConversationHistory};
use crate::llm::client::{CompletionClient, CompletionError, Transport};
use crate::llm::extract::extract_labeled;
use crate::llm::prompt::build_chat_prompt;
use crate::llm::sanitize::sanitize;
use crate::logging::RequestLog;
use crate::protocol::{ExtractedAnswer, Model, TransformationRequest};

/// The one context object behind every user-facing operation: completion
/// client (credential, cache) plus config defaults. Built once at startup and
/// passed by reference; there is no global state.
pub struct Engine {
    client: CompletionClient,
    temperature: f32,
    chat_temperature: f32,
}

impl Engine {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, request_log: Option<RequestLog>) -> Self {
        Self {
            client: CompletionClient::new(transport, request_log),
            temperature: config.llm.temperature,
            chat_temperature: config.llm.chat_temperature,
        }
    }

    /// Rewrite `text` per `instruction`, returning `variants` sanitized
    /// choices in provider order.
    ///
    /// Empty input is a defined no-op, and a provider response with zero
    /// choices maps to an empty list: both return `Ok(vec![])`, never an
    /// error.
    pub async fn rephrase(
        &self,
        instruction: &str,
        text: &str,
        model: Model,
        variants: usize,
    ) -> Result<Vec<String>, CompletionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let request =
            TransformationRequest::new(instruction, text, model, variants, self.temperature)?;
        match self.client.complete(&request).await {
            Ok(choices) => Ok(choices.iter().map(|raw| sanitize(raw)).collect()),
            Err(CompletionError::NoChoices) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Rephrase plus per-choice labeled extraction, for grammar-check-style
    /// instructions. Each result pairs the extracted answer (absent when no
    /// label matched) with the full sanitized text, so a caller can show a
    /// short answer with the full explanation behind it.
    pub async fn rephrase_structured(
        &self,
        instruction: &str,
        text: &str,
        model: Model,
        variants: usize,
        labels: &[&str],
    ) -> Result<Vec<ExtractedAnswer>, CompletionError> {
        let choices = self.rephrase(instruction, text, model, variants).await?;
        Ok(choices
            .into_iter()
            .map(|full_text| ExtractedAnswer {
                answer: extract_labeled(&full_text, labels),
                full_text,
            })
            .collect())
    }

    /// One chat turn. The user prompt is appended to `history` before the
    /// call, so on failure it stays there (the caller decides whether to add
    /// a placeholder assistant entry); the sanitized reply is appended only
    /// on success. The provider receives the entire history every turn.
    pub async fn chat(
        &self,
        instruction: Option<&str>,
        message: &str,
        model: Model,
        history: &mut ConversationHistory,
    ) -> Result<String, CompletionError> {
        if message.is_empty() {
            return Ok(String::new());
        }

        let prompt = build_chat_prompt(instruction, message);
        history.append(ChatMessage::user(prompt));

        let raw = self
            .client
            .converse(history.snapshot(), model, self.chat_temperature)
            .await?;
        let reply = sanitize(&raw);
        history.append(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }
}
