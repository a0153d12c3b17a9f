//! Balance, orders and purchased content of the caller

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Balance, Download, ItemType, Order, OrderDetail, Ownership, PaidAlbum, PaidTrack};

use super::{ApiResult, internal};
use crate::auth::UserIdentity;
use crate::db::{orders, users};
use crate::state::AppState;

/// GET /api/balance
pub async fn balance(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Balance> {
    let balance = users::balance(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(Balance { balance }))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Order>> {
    let orders = orders::list(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let order = orders::find(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let lines = orders::lines(&state.pool, order.id)
        .await
        .map_err(internal)?;
    Ok(Json(OrderDetail { order, lines }))
}

/// GET /api/orders/{id}/downloads
pub async fn order_downloads(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Download>> {
    let order = orders::find(&state.pool, &identity.user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if !order.is_paid {
        return Err(AppError::new(ErrorCode::OrderNotPaid));
    }
    let downloads = orders::order_downloads(&state.pool, order.id)
        .await
        .map_err(internal)?;
    Ok(Json(downloads))
}

/// GET /api/library/tracks
pub async fn purchased_tracks(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<PaidTrack>> {
    let tracks = orders::purchased_tracks(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(tracks))
}

/// GET /api/library/albums
pub async fn purchased_albums(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<PaidAlbum>> {
    let albums = orders::purchased_albums(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(albums))
}

async fn ownership(state: &AppState, user_id: &str, item_type: ItemType, id: i64) -> ApiResult<Ownership> {
    let purchased = orders::has_purchased(&state.pool, user_id, item_type, id)
        .await
        .map_err(internal)?;
    Ok(Json(Ownership { purchased }))
}

/// GET /api/library/tracks/{id}/owned
pub async fn owns_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Ownership> {
    ownership(&state, &identity.user_id, ItemType::Track, id).await
}

/// GET /api/library/albums/{id}/owned
pub async fn owns_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Ownership> {
    ownership(&state, &identity.user_id, ItemType::Album, id).await
}

async fn require_purchase(
    state: &AppState,
    user_id: &str,
    item_type: ItemType,
    id: i64,
) -> Result<(), AppError> {
    let purchased = orders::has_purchased(&state.pool, user_id, item_type, id)
        .await
        .map_err(internal)?;
    if purchased {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::NotPurchased))
    }
}

/// GET /api/library/tracks/{id}/download
pub async fn download_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Download> {
    require_purchase(&state, &identity.user_id, ItemType::Track, id).await?;
    orders::track_download(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::PaidTrackNotFound))
}

/// GET /api/library/albums/{id}/download
pub async fn download_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Download>> {
    require_purchase(&state, &identity.user_id, ItemType::Album, id).await?;
    let downloads = orders::album_downloads(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(downloads))
}
