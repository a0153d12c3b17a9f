//! Studio management: profile, artists, admins, free and paid uploads

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Album, AlbumCreate, ArtistRequest, AuthToken, ItemType, PaidAlbum, PaidAlbumCreate,
    PaidItemRemoval, PaidTrack, PaidTrackCreate, StudioAdmin, StudioDetail, StudioProfile, Track,
    TrackCreate,
};
use shared::money::validate_price;
use shared::util::{now_millis, snowflake_id};

use super::account::fresh_token;
use super::{ApiResult, internal};
use crate::auth::UserIdentity;
use crate::db::catalog::{self, NewAlbum, NewTrack};
use crate::db::shop::{self, NewPaidAlbum, NewPaidTrack, Visibility};
use crate::db::{self, artists, studios, users};
use crate::services::permissions::{
    check_studio_artist, require_studio_manager, require_studio_owner, studio_owns,
};
use crate::state::AppState;
use crate::util::normalize_email;

#[derive(Deserialize)]
pub struct AddAdminRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub user_id: String,
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

async fn detail(state: &AppState, studio_id: i64) -> ApiResult<StudioDetail> {
    let studio = studios::find(&state.pool, studio_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::StudioNotFound))?;
    let artists = artists::list_by_studio(&state.pool, studio_id)
        .await
        .map_err(internal)?;
    Ok(Json(StudioDetail { studio, artists }))
}

// ── Profile ──

/// GET /api/studio
pub async fn mine(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<StudioDetail> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    detail(&state, studio.id).await
}

/// POST /api/studio
///
/// Returns a token carrying the new `studiohead` role.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(profile): Json<StudioProfile>,
) -> ApiResult<AuthToken> {
    check_name(&profile.name)?;
    let id = snowflake_id();
    let created = studios::create(&state.pool, id, &identity.user_id, &profile, now_millis())
        .await
        .map_err(internal)?;
    if !created {
        return Err(AppError::new(ErrorCode::StudioAlreadyExists));
    }

    let detail = serde_json::json!({ "studio_id": id, "name": profile.name });
    let _ = db::audit::log(
        &state.pool,
        &identity.user_id,
        "studio_created",
        Some(&detail),
        None,
        now_millis(),
    )
    .await;

    fresh_token(&state, &identity.user_id).await
}

/// PUT /api/studio
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(profile): Json<StudioProfile>,
) -> ApiResult<StudioDetail> {
    check_name(&profile.name)?;
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    studios::update(&state.pool, studio.id, &profile)
        .await
        .map_err(internal)?;
    detail(&state, studio.id).await
}

/// DELETE /api/studio
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<AuthToken> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    if !studios::delete(&state.pool, studio.id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::StudioNotFound));
    }

    let detail = serde_json::json!({ "studio_id": studio.id, "name": studio.name });
    let _ = db::audit::log(
        &state.pool,
        &identity.user_id,
        "studio_deleted",
        Some(&detail),
        None,
        now_millis(),
    )
    .await;

    fresh_token(&state, &identity.user_id).await
}

// ── Artist requests ──

/// GET /api/studio/requests
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<ArtistRequest>> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    let requests = artists::list_requests(&state.pool, studio.id)
        .await
        .map_err(internal)?;
    Ok(Json(requests))
}

/// POST /api/studio/requests/{id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<StudioDetail> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    let artist_id = artists::accept_request(&state.pool, id, studio.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound))?;
    tracing::info!(studio_id = studio.id, artist_id, "Artist joined studio");
    detail(&state, studio.id).await
}

/// POST /api/studio/requests/{id}/decline
pub async fn decline_request(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    if !artists::decline_request(&state.pool, id, studio.id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::RequestNotFound));
    }
    Ok(Json(serde_json::json!({ "message": "Request declined" })))
}

/// DELETE /api/studio/artists/{id}
pub async fn remove_artist(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(artist_id): Path<i64>,
) -> ApiResult<StudioDetail> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    if !artists::remove_from_studio(&state.pool, artist_id, studio.id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::ArtistNotInStudio));
    }
    detail(&state, studio.id).await
}

// ── Admins ──

/// GET /api/studio/admins
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<StudioAdmin>> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let admins = studios::list_admins(&state.pool, studio.id)
        .await
        .map_err(internal)?;
    Ok(Json(admins))
}

/// POST /api/studio/admins
pub async fn add_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AddAdminRequest>,
) -> ApiResult<Vec<StudioAdmin>> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    let user = users::find_by_email(&state.pool, &normalize_email(&req.email))
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    // One studio per user, as owner or admin
    if studios::managed_by(&state.pool, &user.id)
        .await
        .map_err(internal)?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::StudioAdminExists));
    }
    if !studios::add_admin(&state.pool, studio.id, &user.id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::StudioAdminExists));
    }
    tracing::info!(studio_id = studio.id, user_id = %user.id, "Studio admin added");

    let admins = studios::list_admins(&state.pool, studio.id)
        .await
        .map_err(internal)?;
    Ok(Json(admins))
}

/// DELETE /api/studio/admins/{user_id}
pub async fn remove_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<StudioAdmin>> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    if !studios::remove_admin(&state.pool, studio.id, &user_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::StudioAdminNotFound));
    }
    let admins = studios::list_admins(&state.pool, studio.id)
        .await
        .map_err(internal)?;
    Ok(Json(admins))
}

/// POST /api/studio/transfer
///
/// Returns a token for the caller, who is now a studio admin.
pub async fn transfer_ownership(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<AuthToken> {
    let studio = require_studio_owner(&state.pool, &identity.user_id).await?;
    if !studios::transfer_ownership(&state.pool, studio.id, &identity.user_id, &req.user_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::StudioAdminNotFound));
    }

    let detail = serde_json::json!({ "studio_id": studio.id, "new_owner": req.user_id });
    let _ = db::audit::log(
        &state.pool,
        &identity.user_id,
        "studio_transferred",
        Some(&detail),
        None,
        now_millis(),
    )
    .await;

    fresh_token(&state, &identity.user_id).await
}

// ── Free uploads ──

/// POST /api/studio/tracks
pub async fn create_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<TrackCreate>,
) -> ApiResult<Track> {
    check_name(&req.name)?;
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    check_studio_artist(&state.pool, studio.id, req.artist_id).await?;
    if let Some(album_id) = req.album_id {
        let owner = catalog::album_owner(&state.pool, album_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))?;
        if !studio_owns(owner, studio.id) {
            return Err(AppError::new(ErrorCode::NotItemOwner));
        }
    }

    let id = snowflake_id();
    catalog::create_track(
        &state.pool,
        NewTrack {
            id,
            name: &req.name,
            img: &req.img,
            blob_url: &req.blob_url,
            artist_id: req.artist_id,
            album_id: req.album_id,
            studio_id: Some(studio.id),
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

/// DELETE /api/studio/tracks/{id}
pub async fn delete_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let owner = catalog::track_owner(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))?;
    if !studio_owns(owner, studio.id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    catalog::delete_track(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(serde_json::json!({ "message": "Track deleted" })))
}

/// POST /api/studio/albums
pub async fn create_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AlbumCreate>,
) -> ApiResult<Album> {
    check_name(&req.name)?;
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    check_studio_artist(&state.pool, studio.id, req.artist_id).await?;

    let id = snowflake_id();
    catalog::create_album(
        &state.pool,
        NewAlbum {
            id,
            name: &req.name,
            description: &req.description,
            img: &req.img,
            artist_id: req.artist_id,
            studio_id: Some(studio.id),
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

/// DELETE /api/studio/albums/{id}
pub async fn delete_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let owner = catalog::album_owner(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))?;
    if !studio_owns(owner, studio.id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    catalog::delete_album(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(serde_json::json!({ "message": "Album deleted" })))
}

// ── Paid catalog ──

/// GET /api/studio/shop/tracks
///
/// Includes hidden items.
pub async fn paid_tracks(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<PaidTrack>> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let tracks = shop::tracks_by_studio(&state.pool, studio.id, Visibility::All)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// POST /api/studio/shop/tracks
pub async fn publish_paid_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<PaidTrackCreate>,
) -> ApiResult<PaidTrack> {
    check_name(&req.name)?;
    let price = validate_price(req.price)?;
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    check_studio_artist(&state.pool, studio.id, req.artist_id).await?;

    let id = snowflake_id();
    shop::create_track(
        &state.pool,
        NewPaidTrack {
            id,
            name: &req.name,
            img: &req.img,
            blob_url: &req.blob_url,
            price,
            artist_id: req.artist_id,
            studio_id: studio.id,
        },
    )
    .await
    .map_err(internal)?;
    tracing::info!(studio_id = studio.id, track_id = id, %price, "Paid track published");

    shop::find_track(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::PaidTrackNotFound))
}

/// DELETE /api/studio/shop/tracks/{id}
pub async fn delete_paid_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<PaidItemRemoval> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let owner = shop::track_studio(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaidTrackNotFound))?;
    if owner != Some(studio.id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    let removal = shop::remove_item(&state.pool, ItemType::Track, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaidTrackNotFound))?;
    tracing::info!(studio_id = studio.id, track_id = id, ?removal, "Paid track removed");
    Ok(Json(removal))
}

/// GET /api/studio/shop/albums
///
/// Includes hidden items.
pub async fn paid_albums(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<PaidAlbum>> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let albums = shop::albums_by_studio(&state.pool, studio.id, Visibility::All)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}

/// POST /api/studio/shop/albums
pub async fn publish_paid_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<PaidAlbumCreate>,
) -> ApiResult<PaidAlbum> {
    check_name(&req.name)?;
    let price = validate_price(req.price)?;
    if req.tracks.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "a paid album needs at least one track",
        ));
    }
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    check_studio_artist(&state.pool, studio.id, req.artist_id).await?;

    let id = snowflake_id();
    shop::create_album(
        &state.pool,
        NewPaidAlbum {
            id,
            name: &req.name,
            description: &req.description,
            img: &req.img,
            price,
            artist_id: req.artist_id,
            studio_id: studio.id,
            tracks: &req.tracks,
        },
    )
    .await
    .map_err(internal)?;
    tracing::info!(
        studio_id = studio.id,
        album_id = id,
        tracks = req.tracks.len(),
        %price,
        "Paid album published"
    );

    shop::find_album(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::PaidAlbumNotFound))
}

/// DELETE /api/studio/shop/albums/{id}
pub async fn delete_paid_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<PaidItemRemoval> {
    let studio = require_studio_manager(&state.pool, &identity.user_id).await?;
    let owner = shop::album_studio(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaidAlbumNotFound))?;
    if owner != Some(studio.id) {
        return Err(AppError::new(ErrorCode::NotItemOwner));
    }
    let removal = shop::remove_item(&state.pool, ItemType::Album, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaidAlbumNotFound))?;
    tracing::info!(studio_id = studio.id, album_id = id, ?removal, "Paid album removed");
    Ok(Json(removal))
}
