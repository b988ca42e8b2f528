use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::llm::prompt::build_transform_prompt;

/// Supported completion models. The identifier strings are what the provider
/// expects in the `model` field of a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Model {
    #[serde(rename = "qwen-qwq-32b")]
    #[value(name = "qwen-qwq-32b")]
    QwenQwq32b,
    #[serde(rename = "deepseek-r1-distill-llama-70b")]
    #[value(name = "deepseek-r1-distill-llama-70b")]
    DeepseekR1DistillLlama70b,
    #[serde(rename = "llama-3.3-70b-versatile")]
    #[value(name = "llama-3.3-70b-versatile")]
    Llama33_70bVersatile,
}

impl Model {
    pub fn id(self) -> &'static str {
        match self {
            Model::QwenQwq32b => "qwen-qwq-32b",
            Model::DeepseekR1DistillLlama70b => "deepseek-r1-distill-llama-70b",
            Model::Llama33_70bVersatile => "llama-3.3-70b-versatile",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("variant count must be at least 1")]
    VariantCount,
    #[error("temperature {0} outside supported range 0.0..=2.0")]
    Temperature(f32),
}

/// One text-transformation request. Immutable once built; all five fields
/// together form the cache identity, so construction goes through [`new`]
/// and the fields stay private.
///
/// [`new`]: TransformationRequest::new
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationRequest {
    instruction: String,
    source_text: String,
    model: Model,
    variant_count: usize,
    temperature: f32,
}

impl TransformationRequest {
    pub fn new(
        instruction: impl Into<String>,
        source_text: impl Into<String>,
        model: Model,
        variant_count: usize,
        temperature: f32,
    ) -> Result<Self, RequestError> {
        if variant_count == 0 {
            return Err(RequestError::VariantCount);
        }
        if !(0.0..=2.0).contains(&temperature) {
            return Err(RequestError::Temperature(temperature));
        }
        Ok(Self {
            instruction: instruction.into(),
            source_text: source_text.into(),
            model,
            variant_count,
            temperature,
        })
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn variant_count(&self) -> usize {
        self.variant_count
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// The exact prompt sent to the provider. Byte-for-byte deterministic:
    /// any change to instruction or source text is a cache miss.
    pub fn prompt(&self) -> String {
        build_transform_prompt(&self.instruction, &self.source_text)
    }
}

/// Result of the structured-extraction flow: the short labeled answer when a
/// recognized label matched, plus the full sanitized text for context.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedAnswer {
    pub answer: Option<String>,
    pub full_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation_rejects_zero_variants() {
        let err = TransformationRequest::new("fix", "text", Model::QwenQwq32b, 0, 0.7);
        assert_eq!(err.unwrap_err(), RequestError::VariantCount);
    }

    #[test]
    fn test_request_validation_rejects_out_of_range_temperature() {
        for bad in [-0.1_f32, 2.1, f32::NAN] {
            let err = TransformationRequest::new("fix", "text", Model::QwenQwq32b, 1, bad);
            assert!(matches!(err.unwrap_err(), RequestError::Temperature(_)));
        }
    }

    #[test]
    fn test_request_accepts_boundary_temperatures() {
        for ok in [0.0_f32, 2.0] {
            assert!(TransformationRequest::new("fix", "text", Model::QwenQwq32b, 1, ok).is_ok());
        }
    }

    #[test]
    fn test_model_ids_round_trip_through_serde() {
        let json = serde_json::to_string(&Model::DeepseekR1DistillLlama70b).unwrap();
        assert_eq!(json, "\"deepseek-r1-distill-llama-70b\"");
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Model::DeepseekR1DistillLlama70b);
    }
}
