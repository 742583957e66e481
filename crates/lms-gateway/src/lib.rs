//! HTTP gateway for the LMS.
//!
//! This crate provides the public-facing REST API over [`lms_service::Lms`].
//! It handles:
//!
//! - Bearer token authentication
//! - REST endpoints for courses, users, enrollments, assignments,
//!   materials, results and the dashboard
//! - Multipart uploads for assignment briefs, submissions and materials
//! - Body limits, timeouts and CORS
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Clients                              │
//! │                  (browser / lmsctl)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       lms-gateway                           │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Auth      │ │   Router    │ │    Upload           │    │
//! │  │  Extractor  │ │  + Handlers │ │    Extractor        │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌──────────────┐              ┌──────────┐
//!        │  LmsService  │─────────────▶│  Store   │
//!        └──────────────┘              └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lms_auth::{AuthConfig, HmacTokens};
//! use lms_gateway::{create_router, GatewayConfig, GatewayState};
//! use lms_service::LmsService;
//! use lms_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::default();
//! let store = Arc::new(MemoryStore::with_demo_data());
//! let tokens = Arc::new(HmacTokens::new(config.auth.clone()));
//! let lms = Arc::new(LmsService::new(store, tokens.clone(), config.service_config()));
//!
//! let listen_addr = config.listen_addr.clone();
//! let app = create_router(GatewayState::new(lms, tokens, config));
//!
//! let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::{AuthUser, MaybeAuthUser};
