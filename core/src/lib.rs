// Core Gemini API functionality for the Kisan Mitra assistant

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Request/response wire structures
pub mod types;
pub use types::*;

// Export schema module - Response schemas for structured queries
pub mod schema;
pub use schema::*;

// Export models module - Domain records returned to the UI
pub mod models;
pub use models::*;

// Export prompts module - Prompt text and chat persona
pub mod prompts;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;
