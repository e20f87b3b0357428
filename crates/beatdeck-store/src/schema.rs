//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Artist profiles, keyed by `artist_id`.
    pub const ARTISTS: &str = "artists";

    /// Products, keyed by `product_id`.
    pub const PRODUCTS: &str = "products";

    /// Index: products by artist, keyed by `artist_id || product_id`.
    /// Value is empty (index only).
    pub const PRODUCTS_BY_ARTIST: &str = "products_by_artist";

    /// Attachment records, keyed by `attachment_id`.
    pub const ATTACHMENTS: &str = "attachments";

    /// Cart items, keyed by `cart_item_id`.
    pub const CART_ITEMS: &str = "cart_items";

    /// Index: cart items by user, keyed by `user_id || cart_item_id`.
    pub const CART_ITEMS_BY_USER: &str = "cart_items_by_user";

    /// Coupons, keyed by `coupon_id`.
    pub const COUPONS: &str = "coupons";

    /// Index: coupon code -> `coupon_id` bytes.
    pub const COUPONS_BY_CODE: &str = "coupons_by_code";

    /// Orders, keyed by `order_id` (ULID).
    pub const ORDERS: &str = "orders";

    /// Index: orders by user, keyed by `user_id || order_id`.
    /// ULID order IDs keep the index time-sorted.
    pub const ORDERS_BY_USER: &str = "orders_by_user";

    /// Index: external order number -> `order_id` bytes.
    pub const ORDERS_BY_NUMBER: &str = "orders_by_number";

    /// Memberships, keyed by `membership_id`.
    pub const MEMBERSHIPS: &str = "memberships";

    /// Index: `user_id` -> `membership_id` bytes (one row per user).
    pub const MEMBERSHIPS_BY_USER: &str = "memberships_by_user";

    /// Billing key records, keyed by `membership_id`.
    pub const BILLING_KEYS: &str = "billing_keys";

    /// Index: billing key token -> `membership_id` bytes.
    pub const BILLING_KEYS_BY_KEY: &str = "billing_keys_by_key";

    /// Charge attempts, keyed by `charge_id` (ULID).
    pub const CHARGES: &str = "charges";

    /// Index: charges by membership, keyed by `membership_id || charge_id`.
    pub const CHARGES_BY_MEMBERSHIP: &str = "charges_by_membership";

    /// Processed webhook deliveries for idempotency, keyed by delivery ID.
    pub const WEBHOOK_EVENTS: &str = "webhook_events";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ARTISTS,
        cf::PRODUCTS,
        cf::PRODUCTS_BY_ARTIST,
        cf::ATTACHMENTS,
        cf::CART_ITEMS,
        cf::CART_ITEMS_BY_USER,
        cf::COUPONS,
        cf::COUPONS_BY_CODE,
        cf::ORDERS,
        cf::ORDERS_BY_USER,
        cf::ORDERS_BY_NUMBER,
        cf::MEMBERSHIPS,
        cf::MEMBERSHIPS_BY_USER,
        cf::BILLING_KEYS,
        cf::BILLING_KEYS_BY_KEY,
        cf::CHARGES,
        cf::CHARGES_BY_MEMBERSHIP,
        cf::WEBHOOK_EVENTS,
    ]
}
