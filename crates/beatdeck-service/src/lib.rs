//! Beatdeck HTTP API Service.
//!
//! This crate provides the HTTP API for the beatdeck marketplace, including:
//!
//! - Catalog management (artists, products, licenses, attachments)
//! - Carts and coupons
//! - Checkout, payment completion, and cancellation through PortOne
//! - Recurring memberships charged via billing keys
//! - PortOne webhooks driving order state
//!
//! # Authentication
//!
//! The service supports three authentication methods:
//!
//! 1. **JWT tokens** - For end-user requests (storefront, dashboard)
//! 2. **Service API keys** - For service-to-service requests
//! 3. **Admin API keys** - For privileged endpoints (coupon management)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fx;
pub mod handlers;
pub mod portone;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use fx::ExchangeRates;
pub use portone::{PortOneClient, PortOneError};
pub use routes::create_router;
pub use scheduler::{run_due_charges, spawn_charge_sweep};
pub use state::AppState;
