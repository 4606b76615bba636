//! CDEK Widget Gateway
//!
//! A small HTTP service that proxies pickup point lookups and tariff
//! calculations from the CDEK delivery widget to the CDEK API, attaching
//! server-held credentials so they never reach the browser.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod response;
pub mod upstream;

pub use error::{AppError, Result};

use std::sync::Arc;

use gateway::GatewayService;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub service: Arc<GatewayService>,
}

impl AppState {
    pub fn new(settings: config::Settings, service: GatewayService) -> Self {
        Self {
            settings: Arc::new(settings),
            service: Arc::new(service),
        }
    }

    /// Build the state, including the upstream HTTP client, from settings
    pub fn from_settings(settings: config::Settings) -> Result<Self> {
        let service = GatewayService::from_settings(&settings)?;
        Ok(Self::new(settings, service))
    }
}
