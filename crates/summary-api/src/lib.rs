//! # summary-api
//!
//! HTTP API layer for cart-summary-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for rendering cart summaries
//! - Extras and policy loaded from `config/summary.toml`
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/extras` | List configured extras |
//! | POST | `/api/v1/summary` | Summarize a cart |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
