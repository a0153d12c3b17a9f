//! Public shop listings (visible paid items, never with media URLs)

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{PaidAlbum, PaidAlbumDetail, PaidTrack};

use super::{ApiResult, internal};
use crate::db::shop::{self, Visibility};
use crate::state::AppState;

/// GET /api/shop/tracks
pub async fn list_tracks(State(state): State<AppState>) -> ApiResult<Vec<PaidTrack>> {
    let tracks = shop::list_tracks(&state.pool).await.map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/shop/tracks/{id}
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PaidTrack> {
    shop::find_track(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::PaidTrackNotFound))
}

/// GET /api/shop/albums
pub async fn list_albums(State(state): State<AppState>) -> ApiResult<Vec<PaidAlbum>> {
    let albums = shop::list_albums(&state.pool).await.map_err(internal)?;
    Ok(Json(albums))
}

/// GET /api/shop/albums/{id}
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PaidAlbumDetail> {
    let album = shop::find_album(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaidAlbumNotFound))?;
    let tracks = shop::album_tracks(&state.pool, id).await.map_err(internal)?;
    Ok(Json(PaidAlbumDetail { album, tracks }))
}

/// GET /api/shop/studios/{id}/tracks
pub async fn studio_tracks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PaidTrack>> {
    let tracks = shop::tracks_by_studio(&state.pool, id, Visibility::Public)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/shop/studios/{id}/albums
pub async fn studio_albums(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PaidAlbum>> {
    let albums = shop::albums_by_studio(&state.pool, id, Visibility::Public)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}

/// GET /api/shop/artists/{id}/tracks
pub async fn artist_tracks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PaidTrack>> {
    let tracks = shop::tracks_by_artist(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/shop/artists/{id}/albums
pub async fn artist_albums(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PaidAlbum>> {
    let albums = shop::albums_by_artist(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}
