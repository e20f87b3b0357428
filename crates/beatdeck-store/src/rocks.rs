//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use serde::{Deserialize, Serialize};

use beatdeck_core::{
    Artist, ArtistId, Attachment, AttachmentId, BillingKeyRecord, CartItem, CartItemId, Charge,
    Coupon, CouponId, DomainError, Membership, MembershipId, MembershipStatus, Order, OrderId,
    OrderStatus, Product, ProductId, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// Value stored per processed webhook delivery.
#[derive(Debug, Serialize, Deserialize)]
struct WebhookEventRecord {
    event_type: String,
    received_at: DateTime<Utc>,
}

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Get a CBOR value by key from a column family.
    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Put a CBOR value by key into a column family.
    fn put_value<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, bytes)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Collect index keys under a prefix.
    fn prefix_keys(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, rocksdb::Direction::Forward));

        let mut matched = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            matched.push(key.to_vec());
        }
        Ok(matched)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    fn put_artist(&self, artist: &Artist) -> Result<()> {
        self.put_value(cf::ARTISTS, &keys::artist_key(&artist.id), artist)
    }

    fn get_artist(&self, artist_id: &ArtistId) -> Result<Option<Artist>> {
        self.get_value(cf::ARTISTS, &keys::artist_key(artist_id))
    }

    fn put_product(&self, product: &Product) -> Result<()> {
        let cf_products = self.cf(cf::PRODUCTS)?;
        let cf_by_artist = self.cf(cf::PRODUCTS_BY_ARTIST)?;

        let value = Self::serialize(product)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_products, keys::product_key(&product.id), &value);
        batch.put_cf(
            &cf_by_artist,
            keys::artist_product_key(&product.artist_id, &product.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        self.get_value(cf::PRODUCTS, &keys::product_key(product_id))
    }

    fn list_products_by_artist(&self, artist_id: &ArtistId) -> Result<Vec<Product>> {
        let index_keys =
            self.prefix_keys(cf::PRODUCTS_BY_ARTIST, &keys::artist_products_prefix(artist_id))?;

        let mut products = Vec::new();
        for key in index_keys {
            let product_id = keys::extract_product_id(&key);
            if let Some(product) = self.get_product(&product_id)? {
                if product.is_live() {
                    products.push(product);
                }
            }
        }
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    fn soft_delete_product(&self, product_id: &ProductId) -> Result<()> {
        let mut product = self
            .get_product(product_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "product",
                id: product_id.to_string(),
            })?;

        let now = Utc::now();
        product.deleted_at = Some(now);
        product.updated_at = now;

        self.put_value(cf::PRODUCTS, &keys::product_key(product_id), &product)
    }

    // =========================================================================
    // Attachment Operations
    // =========================================================================

    fn put_attachment(&self, attachment: &Attachment) -> Result<()> {
        self.put_value(
            cf::ATTACHMENTS,
            &keys::attachment_key(&attachment.id),
            attachment,
        )
    }

    fn get_attachment(&self, attachment_id: &AttachmentId) -> Result<Option<Attachment>> {
        self.get_value(cf::ATTACHMENTS, &keys::attachment_key(attachment_id))
    }

    fn soft_delete_attachment(&self, attachment_id: &AttachmentId) -> Result<()> {
        let mut attachment =
            self.get_attachment(attachment_id)?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "attachment",
                    id: attachment_id.to_string(),
                })?;

        attachment.deleted_at = Some(Utc::now());
        self.put_attachment(&attachment)
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    fn add_cart_item(&self, item: &CartItem) -> Result<()> {
        // Reject a duplicate live selection for the same product and tier.
        let existing = self.list_cart_items(&item.user_id)?;
        if existing
            .iter()
            .any(|i| i.matches(&item.product_id, item.license_tier))
        {
            return Err(StoreError::Conflict(format!(
                "cart already contains product {} with {} license",
                item.product_id,
                item.license_tier.as_str()
            )));
        }

        let cf_items = self.cf(cf::CART_ITEMS)?;
        let cf_by_user = self.cf(cf::CART_ITEMS_BY_USER)?;

        let value = Self::serialize(item)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_items, keys::cart_item_key(&item.id), &value);
        batch.put_cf(
            &cf_by_user,
            keys::user_cart_item_key(&item.user_id, &item.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_cart_items(&self, user_id: &UserId) -> Result<Vec<CartItem>> {
        let index_keys =
            self.prefix_keys(cf::CART_ITEMS_BY_USER, &keys::user_cart_items_prefix(user_id))?;

        let mut items = Vec::new();
        for key in index_keys {
            let item_id = keys::extract_cart_item_id(&key);
            if let Some(item) =
                self.get_value::<CartItem>(cf::CART_ITEMS, &keys::cart_item_key(&item_id))?
            {
                if item.is_live() {
                    items.push(item);
                }
            }
        }
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    fn remove_cart_item(&self, user_id: &UserId, item_id: &CartItemId) -> Result<()> {
        let mut item: CartItem = self
            .get_value(cf::CART_ITEMS, &keys::cart_item_key(item_id))?
            .filter(|i: &CartItem| i.user_id == *user_id && i.is_live())
            .ok_or_else(|| StoreError::NotFound {
                entity: "cart item",
                id: item_id.to_string(),
            })?;

        item.deleted_at = Some(Utc::now());
        self.put_value(cf::CART_ITEMS, &keys::cart_item_key(item_id), &item)
    }

    // =========================================================================
    // Coupon Operations
    // =========================================================================

    fn put_coupon(&self, coupon: &Coupon) -> Result<()> {
        let cf_coupons = self.cf(cf::COUPONS)?;
        let cf_by_code = self.cf(cf::COUPONS_BY_CODE)?;

        let value = Self::serialize(coupon)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_coupons, keys::coupon_key(&coupon.id), &value);
        batch.put_cf(
            &cf_by_code,
            keys::coupon_code_key(&coupon.code),
            coupon.id.as_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_coupon(&self, coupon_id: &CouponId) -> Result<Option<Coupon>> {
        self.get_value(cf::COUPONS, &keys::coupon_key(coupon_id))
    }

    fn get_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let cf_by_code = self.cf(cf::COUPONS_BY_CODE)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_code, keys::coupon_code_key(code))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "coupon code index value is not a 16-byte id".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        let coupon_id = CouponId::from_uuid(uuid::Uuid::from_bytes(bytes));

        self.get_coupon(&coupon_id)
    }

    fn redeem_coupon(&self, coupon_id: &CouponId) -> Result<Coupon> {
        let mut coupon = self
            .get_coupon(coupon_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "coupon",
                id: coupon_id.to_string(),
            })?;

        coupon
            .validate(Utc::now())
            .map_err(|e| coupon_invalid(&coupon.code, &e))?;

        coupon.redeemed_count += 1;
        self.put_coupon(&coupon)?;

        Ok(coupon)
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn put_order(&self, order: &Order) -> Result<()> {
        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_by_user = self.cf(cf::ORDERS_BY_USER)?;
        let cf_by_number = self.cf(cf::ORDERS_BY_NUMBER)?;

        let value = Self::serialize(order)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, keys::order_key(&order.id), &value);
        batch.put_cf(
            &cf_by_user,
            keys::user_order_key(&order.user_id, &order.id),
            [],
        );
        batch.put_cf(
            &cf_by_number,
            keys::order_number_key(&order.order_number),
            order.id.to_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        self.get_value(cf::ORDERS, &keys::order_key(order_id))
    }

    fn get_order_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let cf_by_number = self.cf(cf::ORDERS_BY_NUMBER)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_number, keys::order_number_key(order_number))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "order number index value is not a 16-byte id".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        let order_id = OrderId::from_bytes(bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.get_order(&order_id)
    }

    fn list_orders_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>> {
        let mut index_keys =
            self.prefix_keys(cf::ORDERS_BY_USER, &keys::user_orders_prefix(user_id))?;

        // ULID keys iterate oldest first; reverse for newest first.
        index_keys.reverse();

        let mut orders = Vec::new();
        for key in index_keys.into_iter().skip(offset) {
            if orders.len() >= limit {
                break;
            }
            let order_id = keys::extract_order_id(&key);
            if let Some(order) = self.get_order(&order_id)? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    fn transition_order(&self, order_id: &OrderId, to: OrderStatus) -> Result<Order> {
        let mut order = self
            .get_order(order_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?;

        if order.status == to {
            // Webhook redelivery lands here; nothing to do.
            return Ok(order);
        }

        if !order.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to,
            });
        }

        let now = Utc::now();
        order.status = to;
        order.updated_at = now;
        if matches!(to, OrderStatus::Cancelled | OrderStatus::PartialCancelled) {
            order.cancelled_at = Some(now);
        }

        self.put_order(&order)?;
        Ok(order)
    }

    fn complete_order(
        &self,
        order_id: &OrderId,
        payment_id: &str,
        pg_tx_id: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> Result<Order> {
        let mut order = self
            .get_order(order_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?;

        if order.status == OrderStatus::Completed {
            return Ok(order);
        }

        if !order.status.can_transition_to(OrderStatus::Completed) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Completed,
            });
        }

        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_coupons = self.cf(cf::COUPONS)?;
        let cf_by_code = self.cf(cf::COUPONS_BY_CODE)?;
        let cf_cart_items = self.cf(cf::CART_ITEMS)?;

        let mut batch = WriteBatch::default();

        // Flip the order.
        order.status = OrderStatus::Completed;
        order.payment_id = Some(payment_id.to_string());
        order.pg_transaction_id = pg_tx_id.map(String::from);
        order.paid_at = Some(paid_at);
        order.updated_at = Utc::now();
        batch.put_cf(&cf_orders, keys::order_key(order_id), Self::serialize(&order)?);

        // Count the coupon redemption now that the payment is real.
        if let Some(coupon_id) = order.coupon_id {
            if let Some(mut coupon) = self.get_coupon(&coupon_id)? {
                coupon.redeemed_count += 1;
                batch.put_cf(&cf_coupons, keys::coupon_key(&coupon_id), Self::serialize(&coupon)?);
                batch.put_cf(
                    &cf_by_code,
                    keys::coupon_code_key(&coupon.code),
                    coupon_id.as_bytes(),
                );
            }
        }

        // Clear purchased selections from the buyer's cart. Items already
        // soft-deleted are skipped, so a repeated completion clears nothing
        // twice.
        let now = Utc::now();
        for mut item in self.list_cart_items(&order.user_id)? {
            let purchased = order
                .items
                .iter()
                .any(|oi| item.matches(&oi.product_id, oi.license_tier));
            if purchased {
                item.deleted_at = Some(now);
                batch.put_cf(
                    &cf_cart_items,
                    keys::cart_item_key(&item.id),
                    Self::serialize(&item)?,
                );
            }
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(order)
    }

    // =========================================================================
    // Membership Operations
    // =========================================================================

    fn put_membership(&self, membership: &Membership) -> Result<()> {
        let cf_memberships = self.cf(cf::MEMBERSHIPS)?;
        let cf_by_user = self.cf(cf::MEMBERSHIPS_BY_USER)?;

        let value = Self::serialize(membership)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_memberships, keys::membership_key(&membership.id), &value);
        batch.put_cf(
            &cf_by_user,
            keys::user_membership_key(&membership.user_id),
            membership.id.as_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_membership(&self, membership_id: &MembershipId) -> Result<Option<Membership>> {
        self.get_value(cf::MEMBERSHIPS, &keys::membership_key(membership_id))
    }

    fn get_membership_by_user(&self, user_id: &UserId) -> Result<Option<Membership>> {
        let cf_by_user = self.cf(cf::MEMBERSHIPS_BY_USER)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_user, keys::user_membership_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "membership index value is not a 16-byte id".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        let membership_id = MembershipId::from_uuid(uuid::Uuid::from_bytes(bytes));

        self.get_membership(&membership_id)
    }

    fn list_due_memberships(&self, now: DateTime<Utc>) -> Result<Vec<Membership>> {
        // Full scan of the membership family. Membership counts are small
        // compared to orders, and the sweep runs once a day.
        let cf = self.cf(cf::MEMBERSHIPS)?;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        let mut due = Vec::new();
        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let membership: Membership = Self::deserialize(&value)?;
            if membership.status == MembershipStatus::Active && membership.next_payment_date <= now
            {
                due.push(membership);
            }
        }
        due.sort_by_key(|m| m.next_payment_date);
        Ok(due)
    }

    fn put_billing_key(&self, record: &BillingKeyRecord) -> Result<()> {
        let cf_keys = self.cf(cf::BILLING_KEYS)?;
        let cf_by_token = self.cf(cf::BILLING_KEYS_BY_KEY)?;

        let value = Self::serialize(record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_keys, keys::billing_key_key(&record.membership_id), &value);
        batch.put_cf(
            &cf_by_token,
            keys::billing_key_token_key(&record.billing_key),
            record.membership_id.as_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_billing_key(&self, membership_id: &MembershipId) -> Result<Option<BillingKeyRecord>> {
        self.get_value(cf::BILLING_KEYS, &keys::billing_key_key(membership_id))
    }

    fn get_billing_key_by_token(&self, billing_key: &str) -> Result<Option<BillingKeyRecord>> {
        let cf_by_token = self.cf(cf::BILLING_KEYS_BY_KEY)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_token, keys::billing_key_token_key(billing_key))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "billing key index value is not a 16-byte id".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        let membership_id = MembershipId::from_uuid(uuid::Uuid::from_bytes(bytes));

        self.get_billing_key(&membership_id)
    }

    fn put_charge(&self, charge: &Charge) -> Result<()> {
        let cf_charges = self.cf(cf::CHARGES)?;
        let cf_by_membership = self.cf(cf::CHARGES_BY_MEMBERSHIP)?;

        let value = Self::serialize(charge)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_charges, keys::charge_key(&charge.id), &value);
        batch.put_cf(
            &cf_by_membership,
            keys::membership_charge_key(&charge.membership_id, &charge.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_charges_by_membership(
        &self,
        membership_id: &MembershipId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Charge>> {
        let mut index_keys = self.prefix_keys(
            cf::CHARGES_BY_MEMBERSHIP,
            &keys::membership_charges_prefix(membership_id),
        )?;

        index_keys.reverse();

        let mut charges = Vec::new();
        for key in index_keys.into_iter().skip(offset) {
            if charges.len() >= limit {
                break;
            }
            let charge_id = keys::extract_charge_id(&key);
            if let Some(charge) =
                self.get_value::<Charge>(cf::CHARGES, &keys::charge_key(&charge_id))?
            {
                charges.push(charge);
            }
        }

        Ok(charges)
    }

    // =========================================================================
    // Webhook Delivery Operations
    // =========================================================================

    fn has_webhook_event(&self, event_id: &str) -> Result<bool> {
        let cf = self.cf(cf::WEBHOOK_EVENTS)?;
        let exists = self
            .db
            .get_cf(&cf, keys::webhook_event_key(event_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        Ok(exists)
    }

    fn put_webhook_event(&self, event_id: &str, event_type: &str) -> Result<()> {
        let record = WebhookEventRecord {
            event_type: event_type.to_string(),
            received_at: Utc::now(),
        };
        self.put_value(cf::WEBHOOK_EVENTS, &keys::webhook_event_key(event_id), &record)
    }
}

/// Map a domain coupon validation failure into a store error.
fn coupon_invalid(code: &str, err: &DomainError) -> StoreError {
    let reason = match err {
        DomainError::CouponExpired { .. } => "expired".to_string(),
        DomainError::CouponExhausted { .. } => "redemption limit reached".to_string(),
        other => other.to_string(),
    };
    StoreError::CouponInvalid {
        code: code.to_string(),
        reason,
    }
}
