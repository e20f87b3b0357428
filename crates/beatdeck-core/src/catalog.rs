//! Catalog types: artists, products, licenses, attachments.
//!
//! Products are beats or acapellas sold under per-license pricing. Catalog
//! rows are soft-deleted: a `deleted_at` timestamp hides them from listings
//! while order item snapshots keep referencing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ArtistId, AttachmentId, LicenseId, ProductId, UserId};

/// An artist profile selling products on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    /// The artist ID.
    pub id: ArtistId,

    /// The user who owns this artist profile.
    pub user_id: UserId,

    /// Public display name.
    pub stage_name: String,

    /// Short profile text.
    pub bio: Option<String>,

    /// CDN URL of the profile image, if uploaded.
    pub profile_image_url: Option<String>,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Artist {
    /// Create a new artist profile.
    #[must_use]
    pub fn new(user_id: UserId, stage_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: ArtistId::generate(),
            user_id,
            stage_name,
            bio: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check whether this profile is live (not soft-deleted).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// What kind of product is being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// An instrumental beat.
    Beat,

    /// A vocal acapella.
    Acapella,
}

/// License tiers offered for a product.
///
/// Tiers are ordered by exclusivity; a product lists a price per tier it
/// offers, and buyers pick one tier per product at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseTier {
    /// Non-exclusive MP3 lease.
    Basic,

    /// Non-exclusive WAV + stems lease.
    Premium,

    /// Exclusive rights.
    Exclusive,
}

impl LicenseTier {
    /// Stable string form used in store keys and wire payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Exclusive => "exclusive",
        }
    }
}

/// A license offering on a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// The license ID.
    pub id: LicenseId,

    /// The tier this license grants.
    pub tier: LicenseTier,

    /// Price in KRW (stored as integer, no subunits).
    pub price_cents: i64,

    /// Human-readable summary of the usage terms.
    pub terms: Option<String>,
}

impl License {
    /// Create a new license offering.
    #[must_use]
    pub fn new(tier: LicenseTier, price_cents: i64) -> Self {
        Self {
            id: LicenseId::generate(),
            tier,
            price_cents,
            terms: None,
        }
    }
}

/// A product (beat or acapella) in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// The product ID.
    pub id: ProductId,

    /// The artist selling this product.
    pub artist_id: ArtistId,

    /// Track title.
    pub title: String,

    /// Beat or acapella.
    pub kind: ProductKind,

    /// Tempo in BPM, if known.
    pub bpm: Option<u16>,

    /// License offerings; at least one, at most one per tier.
    pub licenses: Vec<License>,

    /// Cover image attachment, if uploaded.
    pub cover_attachment_id: Option<AttachmentId>,

    /// Audio file attachment, if uploaded.
    pub audio_attachment_id: Option<AttachmentId>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a new product with the given license offerings.
    #[must_use]
    pub fn new(artist_id: ArtistId, title: String, kind: ProductKind, licenses: Vec<License>) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            artist_id,
            title,
            kind,
            bpm: None,
            licenses,
            cover_attachment_id: None,
            audio_attachment_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check whether this product is live (not soft-deleted).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Look up the license offering for a tier, if this product offers it.
    #[must_use]
    pub fn license(&self, tier: LicenseTier) -> Option<&License> {
        self.licenses.iter().find(|l| l.tier == tier)
    }
}

/// An uploaded file record (cover art, audio, etc.).
///
/// Attachments are object-store pointers; the bytes live behind the CDN.
/// Deleting an attachment is soft-delete bookkeeping only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// The attachment ID.
    pub id: AttachmentId,

    /// Object key in the bucket.
    pub key: String,

    /// Public CDN URL for the object.
    pub cdn_url: String,

    /// MIME type reported at upload time.
    pub content_type: String,

    /// Size in bytes reported at upload time.
    pub size_bytes: u64,

    /// The user who uploaded the file.
    pub uploaded_by: UserId,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}
