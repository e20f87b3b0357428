//! Beatdeck Client SDK.
//!
//! This crate provides a client library for services to interact with the
//! beatdeck API.
//!
//! # Example
//!
//! ```no_run
//! use beatdeck_client::{BeatdeckClient, ClientOptions};
//!
//! # async fn example() -> Result<(), beatdeck_client::ClientError> {
//! let client = BeatdeckClient::with_options(
//!     "http://beatdeck.marketplace.svc:8080",
//!     "your-service-api-key",
//!     ClientOptions::with_service_name("beatdeck-cron"),
//! );
//!
//! // Run the recurring membership charges
//! let result = client.trigger_charge_sweep().await?;
//!
//! println!("Charged {} memberships ({} failed)", result.charged, result.failed);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{BeatdeckClient, ClientOptions};
pub use error::ClientError;
pub use types::{
    CheckoutItem, CheckoutRequest, CheckoutSelection, CouponSummary, LicenseSummary,
    MembershipSummary, OrderItemSummary, OrderSummary, ProductSummary, SweepResult,
};
