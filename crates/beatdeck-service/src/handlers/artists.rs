//! Artist profile handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use beatdeck_core::{Artist, ArtistId};
use beatdeck_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Artist response.
#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    /// Artist ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Public display name.
    pub stage_name: String,
    /// Profile text.
    pub bio: Option<String>,
    /// CDN URL of the profile image.
    pub profile_image_url: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Artist> for ArtistResponse {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id.to_string(),
            user_id: artist.user_id.to_string(),
            stage_name: artist.stage_name.clone(),
            bio: artist.bio.clone(),
            profile_image_url: artist.profile_image_url.clone(),
            created_at: artist.created_at.to_rfc3339(),
        }
    }
}

/// Create artist request.
#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    /// Public display name.
    pub stage_name: String,
    /// Optional profile text.
    pub bio: Option<String>,
}

/// Create an artist profile for the authenticated user.
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateArtistRequest>,
) -> Result<Json<ArtistResponse>, ApiError> {
    if body.stage_name.trim().is_empty() {
        return Err(ApiError::BadRequest("stage_name must not be empty".into()));
    }

    let mut artist = Artist::new(auth.user_id, body.stage_name);
    artist.bio = body.bio;

    state.store.put_artist(&artist)?;

    tracing::info!(artist_id = %artist.id, user_id = %auth.user_id, "Artist profile created");

    Ok(Json(ArtistResponse::from(&artist)))
}

/// Get an artist profile by ID.
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(artist_id): Path<ArtistId>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let artist = state
        .store
        .get_artist(&artist_id)?
        .filter(Artist::is_live)
        .ok_or_else(|| ApiError::NotFound(format!("artist not found: {artist_id}")))?;

    Ok(Json(ArtistResponse::from(&artist)))
}
