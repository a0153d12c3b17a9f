//! Public free catalog: tracks, albums, artists, studios

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Album, AlbumDetail, Artist, Studio, StudioDetail, Track};

use super::{ApiResult, internal};
use crate::db::catalog::{self, By};
use crate::db::{artists, studios};
use crate::state::AppState;

/// GET /api/tracks
pub async fn list_tracks(State(state): State<AppState>) -> ApiResult<Vec<Track>> {
    let tracks = catalog::list_tracks(&state.pool).await.map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/tracks/{id}
pub async fn get_track(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Track> {
    catalog::find_track(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))
}

/// GET /api/albums
pub async fn list_albums(State(state): State<AppState>) -> ApiResult<Vec<Album>> {
    let albums = catalog::list_albums(&state.pool).await.map_err(internal)?;
    Ok(Json(albums))
}

/// GET /api/albums/{id}
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<AlbumDetail> {
    let album = catalog::find_album(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))?;
    let tracks = catalog::tracks_by(&state.pool, By::Album(id))
        .await
        .map_err(internal)?;
    Ok(Json(AlbumDetail { album, tracks }))
}

/// GET /api/artists
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Vec<Artist>> {
    let list = artists::list(&state.pool).await.map_err(internal)?;
    Ok(Json(list))
}

/// GET /api/artists/{id}
pub async fn get_artist(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Artist> {
    artists::find(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::ArtistNotFound))
}

/// GET /api/artists/{id}/tracks
pub async fn artist_tracks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Track>> {
    let tracks = catalog::tracks_by(&state.pool, By::Artist(id))
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/artists/{id}/albums
pub async fn artist_albums(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Album>> {
    let albums = catalog::albums_by(&state.pool, By::Artist(id))
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}

/// GET /api/studios
pub async fn list_studios(State(state): State<AppState>) -> ApiResult<Vec<Studio>> {
    let list = studios::list(&state.pool).await.map_err(internal)?;
    Ok(Json(list))
}

/// GET /api/studios/{id}
pub async fn get_studio(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StudioDetail> {
    let studio = studios::find(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::StudioNotFound))?;
    let artists = artists::list_by_studio(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(StudioDetail { studio, artists }))
}

/// GET /api/studios/{id}/tracks
pub async fn studio_tracks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Track>> {
    let tracks = catalog::tracks_by(&state.pool, By::Studio(id))
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/studios/{id}/albums
pub async fn studio_albums(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Album>> {
    let albums = catalog::albums_by(&state.pool, By::Studio(id))
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}
