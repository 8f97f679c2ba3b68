//! HTTP handlers for the UWS API.
//!
//! This module contains all route handlers organized by domain.

pub mod health;
pub mod jobs;

pub use health::{api_health, health_check};
