//! UWS Server Library
//!
//! This crate provides an implementation of the IVOA Universal Worker
//! Service (UWS) pattern: asynchronous job submission and management over
//! HTTP.
//!
//! - **Job lifecycle**: submit jobs, drive them through the UWS phase
//!   machine with RUN/ABORT actions, and destroy them on schedule
//! - **Blocking reads**: long-poll a job summary until its phase changes
//! - **Job list**: filter by phase and creation time, newest first
//! - **Pluggable backends**: storage behind [`store::JobStore`], execution
//!   behind [`worker::JobWorker`]
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`error`]: Custom error types with Axum integration
//! - [`models`]: The UWS data model and request bodies
//! - [`handlers`]: HTTP route handlers
//! - [`routes`]: Router assembly
//! - [`service`]: Business logic between handlers and backends
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use uws_server::{
//!     config::AppConfig, routes::build_router, service::UwsService,
//!     state::AppState, store::MemoryStore, worker::NoopWorker,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let store = Arc::new(MemoryStore::new(config.default_expiry, config.max_expiry));
//!     let service = UwsService::new(store, Arc::new(NoopWorker), &config);
//!     let app = build_router(AppState::new(service, config));
//!     // ... serve the app
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod worker;

pub use error::{AppError, AppResult};
