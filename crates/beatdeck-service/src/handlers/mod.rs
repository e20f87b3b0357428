//! HTTP request handlers.

pub mod artists;
pub mod attachments;
pub mod carts;
pub mod coupons;
pub mod health;
pub mod memberships;
pub mod orders;
pub mod products;
pub mod webhooks;
