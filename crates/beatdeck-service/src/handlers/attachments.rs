//! Attachment handlers.
//!
//! Attachments are object-store pointers. Creating one records the metadata
//! and hands back an HMAC-signed upload target; the bytes themselves go
//! straight to the CDN origin.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use beatdeck_core::{Attachment, AttachmentId};
use beatdeck_store::Store;

use crate::auth::AuthUser;
use crate::crypto::hmac_sha256_hex;
use crate::error::ApiError;
use crate::state::AppState;

/// Create attachment request.
#[derive(Debug, Deserialize)]
pub struct CreateAttachmentRequest {
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Create attachment response.
#[derive(Debug, Serialize)]
pub struct CreateAttachmentResponse {
    /// Attachment ID.
    pub id: String,
    /// Object key in the bucket.
    pub key: String,
    /// Public CDN URL once uploaded.
    pub cdn_url: String,
    /// Signed URL the client uploads to.
    pub upload_url: String,
}

/// Record an attachment and issue a signed upload target.
pub async fn create_attachment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAttachmentRequest>,
) -> Result<Json<CreateAttachmentResponse>, ApiError> {
    let secret = state
        .config
        .upload_signing_secret
        .as_ref()
        .ok_or_else(|| ApiError::Internal("upload signing secret not configured".into()))?;

    if body.filename.contains('/') || body.filename.contains("..") {
        return Err(ApiError::BadRequest("invalid filename".into()));
    }

    let id = AttachmentId::generate();
    let key = format!("uploads/{}/{}/{}", auth.user_id, id, body.filename);
    let cdn_url = format!("{}/{key}", state.config.cdn_base_url);

    let signature = hmac_sha256_hex(secret.as_bytes(), &key);
    let upload_url = format!("{cdn_url}?sig={signature}");

    let attachment = Attachment {
        id,
        key: key.clone(),
        cdn_url: cdn_url.clone(),
        content_type: body.content_type,
        size_bytes: body.size_bytes,
        uploaded_by: auth.user_id,
        created_at: Utc::now(),
        deleted_at: None,
    };

    state.store.put_attachment(&attachment)?;

    tracing::info!(
        attachment_id = %id,
        user_id = %auth.user_id,
        key = %key,
        "Attachment recorded"
    );

    Ok(Json(CreateAttachmentResponse {
        id: id.to_string(),
        key,
        cdn_url,
        upload_url,
    }))
}

/// Soft-delete an attachment. Only the uploader may delete.
pub async fn delete_attachment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(attachment_id): Path<AttachmentId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attachment = state
        .store
        .get_attachment(&attachment_id)?
        .filter(|a| a.deleted_at.is_none())
        .ok_or_else(|| ApiError::NotFound(format!("attachment not found: {attachment_id}")))?;

    if attachment.uploaded_by != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    state.store.soft_delete_attachment(&attachment_id)?;

    tracing::info!(attachment_id = %attachment_id, "Attachment deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
