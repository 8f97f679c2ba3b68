//! Application state for the UWS server.
//!
//! This module defines the shared application state that is
//! passed to all handlers via Axum's state management.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::service::UwsService;

/// Shared application state.
///
/// Holds the service layer and configuration handlers need access to.
#[derive(Clone)]
pub struct AppState {
    /// UWS service layer
    pub service: UwsService,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    pub fn new(service: UwsService, config: AppConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
