//! Cart operations

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::models::{AddToCart, CartLine, CartPrice, CartView, ItemType, cart_total};
use shared::money::validate_quantity;
use shared::util::now_millis;

use crate::db::carts::{self, Decrease};
use crate::db::shop;
use crate::error::ServiceResult;

fn item_not_found(item_type: ItemType) -> AppError {
    match item_type {
        ItemType::Track => AppError::new(ErrorCode::PaidTrackNotFound),
        ItemType::Album => AppError::new(ErrorCode::PaidAlbumNotFound),
    }
}

/// Non-empty cart of the user
pub async fn view(pool: &PgPool, user_id: &str) -> ServiceResult<CartView> {
    let lines = carts::lines(pool, user_id).await?;
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }
    Ok(CartView::new(lines))
}

/// Cart total, zero for an empty cart
pub async fn price(pool: &PgPool, user_id: &str) -> ServiceResult<CartPrice> {
    let lines: Vec<CartLine> = carts::lines(pool, user_id).await?;
    Ok(CartPrice {
        total: cart_total(&lines),
    })
}

/// Add a visible paid item, merging with an existing line
pub async fn add(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    req: &AddToCart,
) -> ServiceResult<CartView> {
    validate_quantity(req.quantity)?;

    let (_, price) = shop::visible_price(pool, item_type, req.item_id)
        .await?
        .ok_or_else(|| item_not_found(item_type))?;

    let cart_id = carts::get_or_create(pool, user_id, now_millis()).await?;
    let quantity = carts::add_item(pool, cart_id, item_type, req.item_id, req.quantity, price)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidQuantity, "Cart line would exceed maximum quantity")
        })?;
    tracing::debug!(user_id, %item_type, item_id = req.item_id, quantity, "Added to cart");

    view(pool, user_id).await
}

pub async fn increase(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> ServiceResult<CartView> {
    if carts::increase(pool, user_id, item_type, item_id).await?.is_none() {
        // Either the line is missing or it is already at the maximum
        return Err(match carts::line_quantity(pool, user_id, item_type, item_id).await? {
            Some(_) => AppError::with_message(
                ErrorCode::InvalidQuantity,
                "Cart line is at maximum quantity",
            ),
            None => AppError::new(ErrorCode::CartItemNotFound),
        }
        .into());
    }
    view(pool, user_id).await
}

/// Returns the remaining cart; removing the last line yields an empty view
pub async fn decrease(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> ServiceResult<CartView> {
    match carts::decrease(pool, user_id, item_type, item_id).await? {
        Decrease::NotFound => Err(AppError::new(ErrorCode::CartItemNotFound).into()),
        Decrease::Decremented(_) | Decrease::Removed => {
            Ok(CartView::new(carts::lines(pool, user_id).await?))
        }
    }
}

pub async fn remove(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> ServiceResult<CartView> {
    if !carts::remove_item(pool, user_id, item_type, item_id).await? {
        return Err(AppError::new(ErrorCode::CartItemNotFound).into());
    }
    Ok(CartView::new(carts::lines(pool, user_id).await?))
}

pub async fn clear(pool: &PgPool, user_id: &str) -> ServiceResult<()> {
    carts::clear(pool, user_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_decreasing_single_quantity_line_removes_it(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "3.50").await;
        fixtures::user(&pool, "buyer", "0").await;

        let req = AddToCart { item_id: track, quantity: 1 };
        let view = add(&pool, "buyer", ItemType::Track, &req).await.unwrap();
        assert_eq!(view.items.len(), 1);

        let view = decrease(&pool, "buyer", ItemType::Track, track).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(
            carts::line_quantity(&pool, "buyer", ItemType::Track, track).await.unwrap(),
            None
        );

        let err = decrease(&pool, "buyer", ItemType::Track, track).await.unwrap_err();
        assert_eq!(fixtures::code(err), ErrorCode::CartItemNotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_adding_twice_merges_into_one_line(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "3.50").await;
        fixtures::user(&pool, "buyer", "0").await;

        let req = AddToCart { item_id: track, quantity: 2 };
        add(&pool, "buyer", ItemType::Track, &req).await.unwrap();
        let view = add(&pool, "buyer", ItemType::Track, &req).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 4);
        assert_eq!(view.total, fixtures::dec("14.00"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_hidden_item_cannot_be_added(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "3.50").await;
        fixtures::user(&pool, "buyer", "0").await;
        sqlx::query("UPDATE paid_tracks SET is_visible = FALSE WHERE id = $1")
            .bind(track)
            .execute(&pool)
            .await
            .unwrap();

        let req = AddToCart { item_id: track, quantity: 1 };
        let err = add(&pool, "buyer", ItemType::Track, &req).await.unwrap_err();
        assert_eq!(fixtures::code(err), ErrorCode::PaidTrackNotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_empty_cart_view_fails_but_price_is_zero(pool: PgPool) {
        fixtures::user(&pool, "buyer", "0").await;
        let err = view(&pool, "buyer").await.unwrap_err();
        assert_eq!(fixtures::code(err), ErrorCode::CartEmpty);
        assert_eq!(price(&pool, "buyer").await.unwrap().total, rust_decimal::Decimal::ZERO);
    }
}
