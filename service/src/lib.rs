//! Kisan Mitra service: chat session, inference gateway, coordinator and HTTP API.

pub mod config;
pub mod coordinator;
pub mod gateway;
pub mod http_server;
pub mod session;
