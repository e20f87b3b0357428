//! Key encoding utilities for `RocksDB`.
//!
//! Primary records are keyed by raw ID bytes (16 bytes for both UUIDs and
//! ULIDs). Index families concatenate the parent ID and the child ID; since
//! order and charge IDs are ULIDs, those indexes iterate in creation order.

use beatdeck_core::{
    ArtistId, AttachmentId, CartItemId, ChargeId, CouponId, MembershipId, OrderId, ProductId,
    UserId,
};

/// Primary key for an artist.
#[must_use]
pub fn artist_key(artist_id: &ArtistId) -> Vec<u8> {
    artist_id.as_bytes().to_vec()
}

/// Primary key for a product.
#[must_use]
pub fn product_key(product_id: &ProductId) -> Vec<u8> {
    product_id.as_bytes().to_vec()
}

/// Index key: `artist_id (16) || product_id (16)`.
#[must_use]
pub fn artist_product_key(artist_id: &ArtistId, product_id: &ProductId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(artist_id.as_bytes());
    key.extend_from_slice(product_id.as_bytes());
    key
}

/// Prefix for iterating an artist's products.
#[must_use]
pub fn artist_products_prefix(artist_id: &ArtistId) -> Vec<u8> {
    artist_id.as_bytes().to_vec()
}

/// Extract the product ID from an artist-product index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_product_id(key: &[u8]) -> ProductId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    ProductId::from_uuid(uuid::Uuid::from_bytes(bytes))
}

/// Primary key for an attachment.
#[must_use]
pub fn attachment_key(attachment_id: &AttachmentId) -> Vec<u8> {
    attachment_id.as_bytes().to_vec()
}

/// Primary key for a cart item.
#[must_use]
pub fn cart_item_key(item_id: &CartItemId) -> Vec<u8> {
    item_id.as_bytes().to_vec()
}

/// Index key: `user_id (16) || cart_item_id (16)`.
#[must_use]
pub fn user_cart_item_key(user_id: &UserId, item_id: &CartItemId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(item_id.as_bytes());
    key
}

/// Prefix for iterating a user's cart items.
#[must_use]
pub fn user_cart_items_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the cart item ID from a user-cart index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_cart_item_id(key: &[u8]) -> CartItemId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    CartItemId::from_uuid(uuid::Uuid::from_bytes(bytes))
}

/// Primary key for a coupon.
#[must_use]
pub fn coupon_key(coupon_id: &CouponId) -> Vec<u8> {
    coupon_id.as_bytes().to_vec()
}

/// Index key for a coupon code.
#[must_use]
pub fn coupon_code_key(code: &str) -> Vec<u8> {
    code.as_bytes().to_vec()
}

/// Primary key for an order.
#[must_use]
pub fn order_key(order_id: &OrderId) -> Vec<u8> {
    order_id.to_bytes().to_vec()
}

/// Index key: `user_id (16) || order_id (16)`.
///
/// ULID order IDs keep a user's index entries sorted by creation time.
#[must_use]
pub fn user_order_key(user_id: &UserId, order_id: &OrderId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&order_id.to_bytes());
    key
}

/// Prefix for iterating a user's orders.
#[must_use]
pub fn user_orders_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the order ID from a user-order index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_order_id(key: &[u8]) -> OrderId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    OrderId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Index key for an external order number.
#[must_use]
pub fn order_number_key(order_number: &str) -> Vec<u8> {
    order_number.as_bytes().to_vec()
}

/// Primary key for a membership.
#[must_use]
pub fn membership_key(membership_id: &MembershipId) -> Vec<u8> {
    membership_id.as_bytes().to_vec()
}

/// Index key for a user's membership row.
#[must_use]
pub fn user_membership_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Primary key for a billing key record (keyed by membership).
#[must_use]
pub fn billing_key_key(membership_id: &MembershipId) -> Vec<u8> {
    membership_id.as_bytes().to_vec()
}

/// Index key for a billing key token.
#[must_use]
pub fn billing_key_token_key(billing_key: &str) -> Vec<u8> {
    billing_key.as_bytes().to_vec()
}

/// Primary key for a charge attempt.
#[must_use]
pub fn charge_key(charge_id: &ChargeId) -> Vec<u8> {
    charge_id.to_bytes().to_vec()
}

/// Index key: `membership_id (16) || charge_id (16)`.
#[must_use]
pub fn membership_charge_key(membership_id: &MembershipId, charge_id: &ChargeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(membership_id.as_bytes());
    key.extend_from_slice(&charge_id.to_bytes());
    key
}

/// Prefix for iterating a membership's charges.
#[must_use]
pub fn membership_charges_prefix(membership_id: &MembershipId) -> Vec<u8> {
    membership_id.as_bytes().to_vec()
}

/// Extract the charge ID from a membership-charge index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_charge_id(key: &[u8]) -> ChargeId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    ChargeId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Key for a processed webhook delivery.
#[must_use]
pub fn webhook_event_key(event_id: &str) -> Vec<u8> {
    event_id.as_bytes().to_vec()
}
