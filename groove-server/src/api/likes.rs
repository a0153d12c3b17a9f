//! Likes of free tracks and albums

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Album, Track};

use super::{ApiResult, internal};
use crate::auth::UserIdentity;
use crate::db::{catalog, likes};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LikeState {
    pub liked: bool,
}

/// POST /api/likes/tracks/{id}
pub async fn like_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<LikeState> {
    catalog::track_owner(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TrackNotFound))?;

    if !likes::like_track(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::AlreadyLiked));
    }
    Ok(Json(LikeState { liked: true }))
}

/// DELETE /api/likes/tracks/{id}
pub async fn unlike_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<LikeState> {
    if !likes::unlike_track(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::NotLiked));
    }
    Ok(Json(LikeState { liked: false }))
}

/// GET /api/likes/tracks
pub async fn liked_tracks(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Track>> {
    let tracks = likes::liked_tracks(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// POST /api/likes/albums/{id}
pub async fn like_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<LikeState> {
    catalog::album_owner(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AlbumNotFound))?;

    if !likes::like_album(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::AlreadyLiked));
    }
    Ok(Json(LikeState { liked: true }))
}

/// DELETE /api/likes/albums/{id}
pub async fn unlike_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<LikeState> {
    if !likes::unlike_album(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::NotLiked));
    }
    Ok(Json(LikeState { liked: false }))
}

/// GET /api/likes/albums
pub async fn liked_albums(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Album>> {
    let albums = likes::liked_albums(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}
