use kisan_core::models::{
    validate_land_size, CalculatorResult, ChatMessage, LandUnit, VegetableInfo,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

use crate::gateway::InferenceGateway;

pub const SEARCH_FAILED: &str = "Failed to fetch vegetable information. Please try again.";
pub const CALCULATION_FAILED: &str = "Failed to perform calculation. Please try again.";
pub const CHAT_APOLOGY: &str = "Sorry, I had trouble responding. Please try again.";
pub const INVALID_LAND_SIZE: &str = "Please enter a valid land size.";
pub const NO_VEGETABLE_SELECTED: &str = "Search for a vegetable before calculating.";
pub const NO_REGION_SELECTED: &str = "Please select a region.";

/// Loading and error state of one request flow
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowStatus {
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip)]
    in_flight: usize,
}

impl FlowStatus {
    fn begin(&mut self) {
        self.in_flight += 1;
        self.loading = true;
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}

/// Everything the UI renders
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantState {
    pub vegetable_name: String,
    pub vegetable_data: Option<VegetableInfo>,
    pub calculator_result: Option<CalculatorResult>,
    pub chat_messages: Vec<ChatMessage>,
    pub search: FlowStatus,
    pub calculation: FlowStatus,
    pub chat: FlowStatus,
}

/// Drives the search, calculation and chat flows against an `InferenceGateway`.
///
/// Each flow has its own loading flag and error slot. Overlapping requests in
/// the same flow are not cancelled: whichever settles last owns the result.
pub struct Coordinator {
    gateway: Arc<dyn InferenceGateway>,
    state: Mutex<AssistantState>,
    // Serializes chat turns and transcript resets
    chat_turn: tokio::sync::Mutex<()>,
}

impl Coordinator {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(AssistantState::default()),
            chat_turn: tokio::sync::Mutex::new(()),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut AssistantState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn snapshot(&self) -> AssistantState {
        self.update(|state| state.clone())
    }

    /// Look up the cultivation guide for `query`. Blank queries are ignored.
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.update(|state| {
            state.search.begin();
            state.search.error = None;
            state.calculation.error = None;
            state.vegetable_data = None;
            state.calculator_result = None;
            state.vegetable_name = query.to_string();
        });

        let outcome = self.gateway.fetch_vegetable_info(query).await;

        self.update(|state| {
            match outcome {
                Ok(info) => {
                    info!(vegetable = query, "Search completed");
                    if state.vegetable_name != query {
                        // An older search settled last; its name replaces the newer one
                        state.vegetable_name = query.to_string();
                        state.calculator_result = None;
                    }
                    state.vegetable_data = Some(info);
                }
                Err(e) => {
                    error!(vegetable = query, error = %e, "Search failed");
                    state.search.error = Some(SEARCH_FAILED.to_string());
                }
            }
            state.search.settle();
        });
    }

    /// Estimate yield for the currently selected vegetable.
    ///
    /// Input problems are reported on the calculation error slot without
    /// contacting the model. A result that settles after a different
    /// vegetable was selected is dropped.
    pub async fn calculate(&self, land_size: f64, land_unit: LandUnit, region: &str) {
        let region = region.trim();
        let vegetable = self.update(|state| {
            let rejection = if state.vegetable_data.is_none() {
                Some(NO_VEGETABLE_SELECTED)
            } else if validate_land_size(land_size).is_err() {
                Some(INVALID_LAND_SIZE)
            } else if region.is_empty() {
                Some(NO_REGION_SELECTED)
            } else {
                None
            };

            if let Some(message) = rejection {
                warn!(land_size, region, reason = message, "Calculation rejected");
                state.calculation.error = Some(message.to_string());
                return None;
            }

            state.calculation.begin();
            state.calculation.error = None;
            state.calculator_result = None;
            Some(state.vegetable_name.clone())
        });

        let Some(vegetable) = vegetable else {
            return;
        };

        let outcome = self
            .gateway
            .fetch_calculation(&vegetable, land_size, land_unit, region)
            .await;

        self.update(|state| {
            if state.vegetable_name != vegetable {
                info!(
                    vegetable = %vegetable,
                    selected = %state.vegetable_name,
                    "Discarding calculation for a vegetable no longer selected"
                );
            } else {
                match outcome {
                    Ok(result) => state.calculator_result = Some(result),
                    Err(e) => {
                        error!(vegetable = %vegetable, error = %e, "Calculation failed");
                        state.calculation.error = Some(CALCULATION_FAILED.to_string());
                    }
                }
            }
            state.calculation.settle();
        });
    }

    /// Send a chat message.
    ///
    /// The user's entry is appended before the model is called and is never
    /// removed; the reply slot is filled with either the model's answer or
    /// `CHAT_APOLOGY`.
    pub async fn send_message(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let _turn = self.chat_turn.lock().await;

        self.update(|state| {
            state.chat.begin();
            state.chat_messages.push(ChatMessage::user(text));
        });

        let reply = match self.gateway.send_chat_turn(text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Chat turn failed");
                CHAT_APOLOGY.to_string()
            }
        };

        self.update(|state| {
            state.chat_messages.push(ChatMessage::model(reply));
            state.chat.settle();
        });
    }

    /// Empty the transcript and drop the model-side session together.
    pub async fn clear_chat(&self) {
        let _turn = self.chat_turn.lock().await;
        self.update(|state| state.chat_messages.clear());
        self.gateway.reset_chat_session().await;
        info!("Chat cleared");
    }
}
