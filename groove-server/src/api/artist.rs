//! Artist self-service: profile, free uploads, studio membership

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Album, AlbumCreate, Artist, ArtistProfile, AuthToken, Track, TrackCreate};
use shared::util::{now_millis, snowflake_id};

use super::account::fresh_token;
use super::{ApiResult, internal};
use crate::auth::UserIdentity;
use crate::db::catalog::{self, NewAlbum, NewTrack};
use crate::db::{artists, studios};
use crate::services::permissions::{artist_owns, require_artist};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StudioApplication {
    pub studio_id: i64,
}

fn check_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "name must not be empty",
        ));
    }
    Ok(())
}

/// Album must exist and belong to the artist
async fn own_album(state: &AppState, artist_id: i64, album_id: i64) -> Result<(), AppError> {
    let owner = catalog::album_owner(&state.pool, album_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))?;
    if !artist_owns(owner, artist_id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    Ok(())
}

async fn own_track(state: &AppState, artist_id: i64, track_id: i64) -> Result<(), AppError> {
    let owner = catalog::track_owner(&state.pool, track_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))?;
    if !artist_owns(owner, artist_id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    Ok(())
}

/// GET /api/artist
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Artist> {
    Ok(Json(require_artist(&state.pool, &identity.user_id).await?))
}

/// POST /api/artist
///
/// Returns a token carrying the new `artist` role.
pub async fn register(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(profile): Json<ArtistProfile>,
) -> ApiResult<AuthToken> {
    check_name(&profile.name)?;
    let created = artists::create(&state.pool, snowflake_id(), &identity.user_id, &profile)
        .await
        .map_err(internal)?;
    if !created {
        return Err(AppError::new(ErrorCode::ArtistAlreadyExists));
    }
    tracing::info!(user_id = %identity.user_id, name = %profile.name, "Artist registered");
    fresh_token(&state, &identity.user_id).await
}

/// PUT /api/artist
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(profile): Json<ArtistProfile>,
) -> ApiResult<Artist> {
    check_name(&profile.name)?;
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    artists::update(&state.pool, artist.id, &profile)
        .await
        .map_err(internal)?;
    Ok(Json(require_artist(&state.pool, &identity.user_id).await?))
}

/// DELETE /api/artist
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<AuthToken> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    artists::delete(&state.pool, artist.id, &identity.user_id)
        .await
        .map_err(internal)?;
    tracing::info!(user_id = %identity.user_id, artist_id = artist.id, "Artist profile deleted");
    fresh_token(&state, &identity.user_id).await
}

/// POST /api/artist/tracks
pub async fn create_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<TrackCreate>,
) -> ApiResult<Track> {
    check_name(&req.name)?;
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    if let Some(album_id) = req.album_id {
        own_album(&state, artist.id, album_id).await?;
    }

    let id = snowflake_id();
    catalog::create_track(
        &state.pool,
        NewTrack {
            id,
            name: &req.name,
            img: &req.img,
            blob_url: &req.blob_url,
            artist_id: Some(artist.id),
            album_id: req.album_id,
            studio_id: None,
        },
    )
    .await
    .map_err(internal)?;

    catalog::find_track(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))
}

/// DELETE /api/artist/tracks/{id}
pub async fn delete_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    own_track(&state, artist.id, id).await?;
    catalog::delete_track(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(serde_json::json!({ "message": "Track deleted" })))
}

/// POST /api/artist/albums
pub async fn create_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AlbumCreate>,
) -> ApiResult<Album> {
    check_name(&req.name)?;
    let artist = require_artist(&state.pool, &identity.user_id).await?;

    let id = snowflake_id();
    catalog::create_album(
        &state.pool,
        NewAlbum {
            id,
            name: &req.name,
            description: &req.description,
            img: &req.img,
            artist_id: Some(artist.id),
            studio_id: None,
            tracks: &req.tracks,
        },
    )
    .await
    .map_err(internal)?;

    catalog::find_album(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))
}

/// DELETE /api/artist/albums/{id}
///
/// Tracks of the album stay, without an album.
pub async fn delete_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    own_album(&state, artist.id, id).await?;
    catalog::delete_album(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(serde_json::json!({ "message": "Album deleted" })))
}

/// PUT /api/artist/albums/{album_id}/tracks/{track_id}
pub async fn attach_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((album_id, track_id)): Path<(i64, i64)>,
) -> ApiResult<Track> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    own_album(&state, artist.id, album_id).await?;
    own_track(&state, artist.id, track_id).await?;
    catalog::set_track_album(&state.pool, track_id, Some(album_id))
        .await
        .map_err(internal)?;
    catalog::find_track(&state.pool, track_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))
}

/// DELETE /api/artist/albums/{album_id}/tracks/{track_id}
pub async fn detach_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((album_id, track_id)): Path<(i64, i64)>,
) -> ApiResult<Track> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    own_album(&state, artist.id, album_id).await?;
    let track = catalog::find_track(&state.pool, track_id)
        .await
        .map_err(internal)?
        .filter(|t| t.album_id == Some(album_id))
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))?;
    if track.artist_id != Some(artist.id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    catalog::set_track_album(&state.pool, track_id, None)
        .await
        .map_err(internal)?;
    Ok(Json(Track {
        album_id: None,
        album_name: None,
        ..track
    }))
}

/// POST /api/artist/studio-requests
pub async fn apply_for_studio(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<StudioApplication>,
) -> ApiResult<serde_json::Value> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    if artist.studio_id.is_some() {
        return Err(AppError::new(ErrorCode::ArtistAlreadyInStudio));
    }
    studios::find(&state.pool, req.studio_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::StudioNotFound))?;

    let request_id = snowflake_id();
    let created = artists::create_request(
        &state.pool,
        request_id,
        req.studio_id,
        artist.id,
        now_millis(),
    )
    .await
    .map_err(internal)?;
    if !created {
        return Err(AppError::new(ErrorCode::RequestAlreadyExists));
    }
    Ok(Json(serde_json::json!({
        "request_id": request_id,
        "studio_id": req.studio_id,
    })))
}

/// DELETE /api/artist/studio
pub async fn leave_studio(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Artist> {
    let artist = require_artist(&state.pool, &identity.user_id).await?;
    let Some(studio_id) = artist.studio_id else {
        return Err(AppError::new(ErrorCode::ArtistNotInStudio));
    };
    artists::remove_from_studio(&state.pool, artist.id, studio_id)
        .await
        .map_err(internal)?;
    Ok(Json(Artist {
        studio_id: None,
        studio_name: None,
        ..artist
    }))
}
