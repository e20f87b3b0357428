//! Core types and utilities for beatdeck.
//!
//! This crate provides the foundational types used throughout the beatdeck
//! marketplace:
//!
//! - **Identifiers**: `UserId`, `ProductId`, `OrderId`, `ChargeId`, ...
//! - **Catalog**: `Artist`, `Product`, `License`, `Attachment`
//! - **Carts**: `CartItem`
//! - **Coupons**: `Coupon`, `Discount`
//! - **Orders**: `Order`, `OrderItem`, `OrderStatus`
//! - **Memberships**: `Membership`, `BillingKeyRecord`, `Charge`
//!
//! # Money
//!
//! All amounts are stored as `i64` integer cents (KRW amounts are whole won,
//! treated the same way) to avoid floating point precision issues. Currency
//! conversion happens once at checkout and the applied rate is recorded on
//! the order.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod error;
pub mod ids;
pub mod membership;
pub mod order;

pub use cart::CartItem;
pub use catalog::{Artist, Attachment, License, LicenseTier, Product, ProductKind};
pub use coupon::{Coupon, Discount};
pub use error::{DomainError, Result};
pub use ids::{
    ArtistId, AttachmentId, CartItemId, ChargeId, CouponId, IdError, LicenseId, MembershipId,
    OrderId, ProductId, UserId,
};
pub use membership::{
    BillingKeyRecord, BillingKeyStatus, Charge, ChargeStatus, Membership, MembershipPlan,
    MembershipStatus, MONTH_PLAN_PRICE_CENTS, YEAR_PLAN_PRICE_CENTS,
};
pub use order::{Currency, Order, OrderItem, OrderStatus};
