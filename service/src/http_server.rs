use crate::coordinator::{AssistantState, Coordinator};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use kisan_core::models::{LandUnit, INDIAN_REGIONS};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<Coordinator>,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    land_size: f64,
    #[serde(default)]
    land_unit: LandUnit,
    region: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    message: String,
}

/// Choices a client needs to render the calculator form
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    regions: Vec<&'static str>,
    land_units: Vec<LandUnit>,
}

/// Build the API router around a coordinator
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    let state = AppState { coordinator };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/state", get(handle_state))
        .route("/api/options", get(handle_options))
        .route("/api/search", post(handle_search))
        .route("/api/calculate", post(handle_calculate))
        .route("/api/chat", post(handle_chat).delete(handle_clear_chat))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(coordinator: Arc<Coordinator>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, router(coordinator))
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "Kisan Mitra is running"
}

async fn handle_state(State(state): State<AppState>) -> Json<AssistantState> {
    Json(state.coordinator.snapshot())
}

async fn handle_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        regions: INDIAN_REGIONS.to_vec(),
        land_units: LandUnit::ALL.to_vec(),
    })
}

async fn handle_search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Json<AssistantState> {
    debug!(query = %payload.query, "Search request");
    state.coordinator.search(&payload.query).await;
    Json(state.coordinator.snapshot())
}

async fn handle_calculate(
    State(state): State<AppState>,
    Json(payload): Json<CalculateRequest>,
) -> Json<AssistantState> {
    debug!(
        land_size = payload.land_size,
        land_unit = %payload.land_unit,
        region = %payload.region,
        "Calculate request"
    );
    state
        .coordinator
        .calculate(payload.land_size, payload.land_unit, &payload.region)
        .await;
    Json(state.coordinator.snapshot())
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<AssistantState> {
    state.coordinator.send_message(&payload.message).await;
    Json(state.coordinator.snapshot())
}

async fn handle_clear_chat(State(state): State<AppState>) -> Json<AssistantState> {
    state.coordinator.clear_chat().await;
    Json(state.coordinator.snapshot())
}
