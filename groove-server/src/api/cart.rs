//! Shopping cart API

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{AddToCart, CartPrice, CartView, ItemType};

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::services::cart;
use crate::state::AppState;

/// GET /api/cart
pub async fn view(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<CartView> {
    Ok(Json(cart::view(&state.pool, &identity.user_id).await?))
}

/// GET /api/cart/price
pub async fn price(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<CartPrice> {
    Ok(Json(cart::price(&state.pool, &identity.user_id).await?))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<CartPrice> {
    cart::clear(&state.pool, &identity.user_id).await?;
    Ok(Json(CartPrice {
        total: rust_decimal::Decimal::ZERO,
    }))
}

/// POST /api/cart/tracks
pub async fn add_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AddToCart>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::add(&state.pool, &identity.user_id, ItemType::Track, &req).await?,
    ))
}

/// POST /api/cart/albums
pub async fn add_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AddToCart>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::add(&state.pool, &identity.user_id, ItemType::Album, &req).await?,
    ))
}

/// DELETE /api/cart/tracks/{id}
pub async fn remove_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::remove(&state.pool, &identity.user_id, ItemType::Track, id).await?,
    ))
}

/// DELETE /api/cart/albums/{id}
pub async fn remove_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::remove(&state.pool, &identity.user_id, ItemType::Album, id).await?,
    ))
}

/// POST /api/cart/tracks/{id}/increase
pub async fn increase_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::increase(&state.pool, &identity.user_id, ItemType::Track, id).await?,
    ))
}

/// POST /api/cart/albums/{id}/increase
pub async fn increase_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::increase(&state.pool, &identity.user_id, ItemType::Album, id).await?,
    ))
}

/// POST /api/cart/tracks/{id}/decrease
pub async fn decrease_track(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::decrease(&state.pool, &identity.user_id, ItemType::Track, id).await?,
    ))
}

/// POST /api/cart/albums/{id}/decrease
pub async fn decrease_album(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    Ok(Json(
        cart::decrease(&state.pool, &identity.user_id, ItemType::Album, id).await?,
    ))
}
