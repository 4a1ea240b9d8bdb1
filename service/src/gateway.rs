use async_trait::async_trait;
use kisan_core::client::GeminiClient;
use kisan_core::config::KisanConfig;
use kisan_core::errors::{KisanError, KisanResult};
use kisan_core::models::{validate_land_size, CalculatorResult, LandUnit, VegetableInfo};
use kisan_core::prompts::{calculation_prompt, vegetable_info_prompt};
use kisan_core::schema::{calculator_schema, vegetable_info_schema};
use tracing::{debug, info, instrument, warn};

use crate::session::ChatSessionSlot;

/// Number of alternative crops the calculation prompt asks for
pub const SUGGESTED_CROP_LIMIT: usize = 3;

/// Remote operations the assistant delegates to the language model
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Structured cultivation guide for `name`
    async fn fetch_vegetable_info(&self, name: &str) -> KisanResult<VegetableInfo>;

    /// Yield estimate and alternative crops for a plot of land
    async fn fetch_calculation(
        &self,
        name: &str,
        land_size: f64,
        land_unit: LandUnit,
        region: &str,
    ) -> KisanResult<CalculatorResult>;

    /// Send one user turn on the shared chat session and return the reply
    async fn send_chat_turn(&self, message: &str) -> KisanResult<String>;

    /// Drop the chat session; the next turn starts a fresh one
    async fn reset_chat_session(&self);
}

fn require_name(name: &str) -> KisanResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KisanError::Validation(
            "vegetable name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

/// `InferenceGateway` backed by the Gemini REST API
#[derive(Debug)]
pub struct GeminiGateway {
    client: GeminiClient,
    region_context: String,
    chat: ChatSessionSlot,
}

impl GeminiGateway {
    pub fn new(client: GeminiClient, config: &KisanConfig) -> Self {
        Self {
            client,
            region_context: config.region_context().to_string(),
            chat: ChatSessionSlot::new(config.system_instruction()),
        }
    }

    pub fn chat_sessions(&self) -> &ChatSessionSlot {
        &self.chat
    }
}

#[async_trait]
impl InferenceGateway for GeminiGateway {
    #[instrument(skip(self))]
    async fn fetch_vegetable_info(&self, name: &str) -> KisanResult<VegetableInfo> {
        let name = require_name(name)?;
        let prompt = vegetable_info_prompt(name, &self.region_context);

        let info: VegetableInfo = self
            .client
            .generate_structured(&prompt, vegetable_info_schema())
            .await?;

        info!(pairings = info.crop_pairings.len(), "Fetched vegetable info");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn fetch_calculation(
        &self,
        name: &str,
        land_size: f64,
        land_unit: LandUnit,
        region: &str,
    ) -> KisanResult<CalculatorResult> {
        let name = require_name(name)?;
        validate_land_size(land_size)?;

        let prompt = calculation_prompt(name, land_size, land_unit, region, &self.region_context);
        let result: CalculatorResult = self
            .client
            .generate_structured(&prompt, calculator_schema())
            .await?;

        if result.profitable_crops.len() > SUGGESTED_CROP_LIMIT {
            // Kept as returned; the limit is a prompt hint only
            warn!(
                count = result.profitable_crops.len(),
                "Model suggested more alternative crops than requested"
            );
        }

        info!(crops = result.profitable_crops.len(), "Fetched yield calculation");
        Ok(result)
    }

    #[instrument(skip(self, message), fields(message_len = message.len()))]
    async fn send_chat_turn(&self, message: &str) -> KisanResult<String> {
        let mut session = self.chat.get_or_create().await;
        let request = session.build_request(message);
        debug!(session_id = %session.id, history = session.history().len(), "Sending chat turn");

        let reply = self.client.generate_text(&request).await?;
        session.record_turn(message, &reply);
        Ok(reply)
    }

    async fn reset_chat_session(&self) {
        self.chat.destroy().await;
    }
}
