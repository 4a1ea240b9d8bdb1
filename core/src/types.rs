use serde::{Deserialize, Serialize};

use crate::schema::Schema;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";

/// Request to Gemini API to generate content
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single user turn, no system instruction.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(Content {
            parts: vec![Part::text(instruction)],
            role: None,
        });
        self
    }

    /// Constrain the reply to JSON matching `schema`.
    pub fn with_response_schema(mut self, schema: Schema) -> Self {
        let config = self.generation_config.get_or_insert_with(GenerationConfig::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }
}

/// Content structure for requests and responses
#[derive(Serialize, Clone, Debug, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: Some(ROLE_USER.to_string()),
        }
    }

    pub fn model(text: &str) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: Some(ROLE_MODEL.to_string()),
        }
    }
}

/// Part structure for a piece of content
#[derive(Serialize, Clone, Debug, Deserialize, PartialEq)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

/// Generation configuration options
#[derive(Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Schema>,
}

/// Response from Gemini API
#[derive(Deserialize, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// Candidate in the response
#[derive(Deserialize, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Set when the prompt itself was blocked
#[derive(Deserialize, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}
