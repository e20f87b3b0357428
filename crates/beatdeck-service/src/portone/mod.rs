//! PortOne payment gateway integration.
//!
//! The client talks to the PortOne V2 REST API for payment lookup,
//! billing-key charges, cancellation, and billing-key deletion.

mod client;
pub mod types;

pub use client::{PortOneClient, PortOneError};
