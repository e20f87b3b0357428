//! `RocksDB` storage layer for beatdeck.
//!
//! This crate provides persistent storage for the marketplace: catalog,
//! carts, coupons, orders, memberships, billing keys, charge attempts, and
//! webhook-delivery dedup records. Values are CBOR-encoded and indexed via
//! column families.
//!
//! # Example
//!
//! ```no_run
//! use beatdeck_store::{RocksStore, Store};
//! use beatdeck_core::{Artist, UserId};
//!
//! let store = RocksStore::open("/tmp/beatdeck-db").unwrap();
//!
//! let artist = Artist::new(UserId::generate(), "prod. vega".into());
//! store.put_artist(&artist).unwrap();
//!
//! let retrieved = store.get_artist(&artist.id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};

use beatdeck_core::{
    Artist, ArtistId, Attachment, AttachmentId, BillingKeyRecord, CartItem, CartItemId, Charge,
    Coupon, CouponId, Membership, MembershipId, Order, OrderId, OrderStatus, Product, ProductId,
    UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Insert or update an artist profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_artist(&self, artist: &Artist) -> Result<()>;

    /// Get an artist by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_artist(&self, artist_id: &ArtistId) -> Result<Option<Artist>>;

    /// Insert or update a product.
    ///
    /// This also maintains the by-artist index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_product(&self, product: &Product) -> Result<()>;

    /// Get a product by ID (including soft-deleted products).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// List an artist's live products.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_products_by_artist(&self, artist_id: &ArtistId) -> Result<Vec<Product>>;

    /// Soft-delete a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product doesn't exist.
    fn soft_delete_product(&self, product_id: &ProductId) -> Result<()>;

    // =========================================================================
    // Attachment Operations
    // =========================================================================

    /// Insert or update an attachment record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_attachment(&self, attachment: &Attachment) -> Result<()>;

    /// Get an attachment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_attachment(&self, attachment_id: &AttachmentId) -> Result<Option<Attachment>>;

    /// Soft-delete an attachment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the attachment doesn't exist.
    fn soft_delete_attachment(&self, attachment_id: &AttachmentId) -> Result<()>;

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Add a cart item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the user already has a live item for
    /// the same (product, license tier) selection.
    fn add_cart_item(&self, item: &CartItem) -> Result<()>;

    /// List a user's live cart items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_cart_items(&self, user_id: &UserId) -> Result<Vec<CartItem>>;

    /// Soft-delete a cart item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the item doesn't exist or is already
    /// deleted.
    fn remove_cart_item(&self, user_id: &UserId, item_id: &CartItemId) -> Result<()>;

    // =========================================================================
    // Coupon Operations
    // =========================================================================

    /// Insert or update a coupon.
    ///
    /// This also maintains the by-code index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_coupon(&self, coupon: &Coupon) -> Result<()>;

    /// Get a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_coupon(&self, coupon_id: &CouponId) -> Result<Option<Coupon>>;

    /// Get a coupon by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>>;

    /// Redeem a coupon: validate it and bump its redemption count.
    ///
    /// Returns the updated coupon.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the coupon doesn't exist.
    /// - `StoreError::CouponInvalid` if it is expired, deleted, or exhausted.
    fn redeem_coupon(&self, coupon_id: &CouponId) -> Result<Coupon>;

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Insert an order.
    ///
    /// This also maintains the by-user and by-number indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_order(&self, order: &Order) -> Result<()>;

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Get an order by its external order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order_by_number(&self, order_number: &str) -> Result<Option<Order>>;

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_orders_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>>;

    /// Apply a status transition to an order.
    ///
    /// A transition to the current status is a no-op and returns the stored
    /// order unchanged, so webhook redelivery is harmless. Entering a
    /// cancellation state records `cancelled_at`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the order doesn't exist.
    /// - `StoreError::InvalidTransition` if the edge is not legal.
    fn transition_order(&self, order_id: &OrderId, to: OrderStatus) -> Result<Order>;

    /// Complete an order: status flip, payment metadata, coupon redemption,
    /// and cart clearing in one atomic write.
    ///
    /// Live cart items matching the order's (product, tier) pairs are
    /// soft-deleted; items already deleted are skipped, so repeating the call
    /// clears nothing twice. If the order is already COMPLETED the call is a
    /// no-op returning the stored order.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the order doesn't exist.
    /// - `StoreError::InvalidTransition` if the order cannot complete.
    fn complete_order(
        &self,
        order_id: &OrderId,
        payment_id: &str,
        pg_tx_id: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> Result<Order>;

    // =========================================================================
    // Membership Operations
    // =========================================================================

    /// Insert or update a membership.
    ///
    /// This also maintains the by-user index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_membership(&self, membership: &Membership) -> Result<()>;

    /// Get a membership by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_membership(&self, membership_id: &MembershipId) -> Result<Option<Membership>>;

    /// Get a user's membership row, if any (active or cancelled).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_membership_by_user(&self, user_id: &UserId) -> Result<Option<Membership>>;

    /// List ACTIVE memberships whose next payment date is due at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_due_memberships(&self, now: DateTime<Utc>) -> Result<Vec<Membership>>;

    /// Insert or update a billing key record.
    ///
    /// This also maintains the by-token index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_billing_key(&self, record: &BillingKeyRecord) -> Result<()>;

    /// Get the billing key record for a membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_billing_key(&self, membership_id: &MembershipId) -> Result<Option<BillingKeyRecord>>;

    /// Get a billing key record by its provider token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_billing_key_by_token(&self, billing_key: &str) -> Result<Option<BillingKeyRecord>>;

    /// Insert a charge attempt.
    ///
    /// This also maintains the by-membership index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_charge(&self, charge: &Charge) -> Result<()>;

    /// List a membership's charge attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_charges_by_membership(
        &self,
        membership_id: &MembershipId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Charge>>;

    // =========================================================================
    // Webhook Delivery Operations (for idempotency)
    // =========================================================================

    /// Check if a webhook delivery has already been processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_webhook_event(&self, event_id: &str) -> Result<bool>;

    /// Record a processed webhook delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_webhook_event(&self, event_id: &str, event_type: &str) -> Result<()>;
}
