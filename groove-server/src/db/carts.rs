//! Shopping carts and their lines

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use shared::models::{CartLine, ItemType};
use shared::money::MAX_QUANTITY;

/// Id of the user's cart, created on first use
pub async fn get_or_create(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    now: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO carts (id, user_id, created_at) VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING id",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Add `quantity` of an item, merging with an existing line.
///
/// Returns the resulting quantity, or `None` if it would exceed the maximum.
pub async fn add_item(
    pool: &PgPool,
    cart_id: i64,
    item_type: ItemType,
    item_id: i64,
    quantity: i32,
    price: Decimal,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO cart_items (id, cart_id, item_type, item_id, quantity, price)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (cart_id, item_type, item_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
         WHERE cart_items.quantity + EXCLUDED.quantity <= $7
         RETURNING quantity",
    )
    .bind(shared::util::snowflake_id())
    .bind(cart_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .bind(quantity)
    .bind(price)
    .bind(MAX_QUANTITY)
    .fetch_optional(pool)
    .await
}

pub async fn line_quantity(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT ci.quantity FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         WHERE c.user_id = $1 AND ci.item_type = $2 AND ci.item_id = $3",
    )
    .bind(user_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// +1, capped at the maximum quantity. `None` if nothing was changed.
pub async fn increase(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE cart_items ci SET quantity = ci.quantity + 1
         FROM carts c
         WHERE c.id = ci.cart_id AND c.user_id = $1
           AND ci.item_type = $2 AND ci.item_id = $3 AND ci.quantity < $4
         RETURNING ci.quantity",
    )
    .bind(user_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .bind(MAX_QUANTITY)
    .fetch_optional(pool)
    .await
}

/// Outcome of decrementing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrease {
    Decremented(i32),
    Removed,
    NotFound,
}

/// -1; a line at quantity 1 is removed instead
pub async fn decrease(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> Result<Decrease, sqlx::Error> {
    let decremented: Option<i32> = sqlx::query_scalar(
        "UPDATE cart_items ci SET quantity = ci.quantity - 1
         FROM carts c
         WHERE c.id = ci.cart_id AND c.user_id = $1
           AND ci.item_type = $2 AND ci.item_id = $3 AND ci.quantity > 1
         RETURNING ci.quantity",
    )
    .bind(user_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .fetch_optional(pool)
    .await?;
    if let Some(quantity) = decremented {
        return Ok(Decrease::Decremented(quantity));
    }

    if remove_item(pool, user_id, item_type, item_id).await? {
        Ok(Decrease::Removed)
    } else {
        Ok(Decrease::NotFound)
    }
}

/// `false` if there was no such line
pub async fn remove_item(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM cart_items ci
         USING carts c
         WHERE c.id = ci.cart_id AND c.user_id = $1
           AND ci.item_type = $2 AND ci.item_id = $3",
    )
    .bind(user_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct LineRow {
    item_id: i64,
    item_type: String,
    name: String,
    quantity: i32,
    price: Decimal,
}

/// Lines of the user's cart with item names and the captured prices
pub async fn lines(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<Vec<CartLine>, sqlx::Error> {
    let rows: Vec<LineRow> = sqlx::query_as(
        "SELECT ci.item_id, ci.item_type,
                COALESCE(pt.name, pa.name, '') AS name,
                ci.quantity, ci.price
         FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         LEFT JOIN paid_tracks pt ON ci.item_type = 'track' AND pt.id = ci.item_id
         LEFT JOIN paid_albums pa ON ci.item_type = 'album' AND pa.id = ci.item_id
         WHERE c.user_id = $1
         ORDER BY ci.id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|r| match r.item_type.parse::<ItemType>() {
            Ok(item_type) => Some(CartLine {
                item_id: r.item_id,
                item_type,
                name: r.name,
                quantity: r.quantity,
                price: r.price,
            }),
            Err(e) => {
                tracing::warn!(item_id = r.item_id, "Skipping cart line: {e}");
                None
            }
        })
        .collect())
}

/// Drop the cart lines whose items are part of the given order.
///
/// Lines added after the order was placed stay in the cart.
pub async fn remove_ordered(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    order_number: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM cart_items ci
         USING carts c, orders o
         WHERE c.id = ci.cart_id AND c.user_id = $1
           AND o.order_number = $2 AND o.user_id = $1
           AND ((ci.item_type = 'track' AND ci.item_id IN
                   (SELECT paid_track_id FROM ordered_tracks WHERE order_id = o.id))
             OR (ci.item_type = 'album' AND ci.item_id IN
                   (SELECT paid_album_id FROM ordered_albums WHERE order_id = o.id)))",
    )
    .bind(user_id)
    .bind(order_number)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Delete the user's cart and all its lines
pub async fn clear(executor: impl PgExecutor<'_>, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM carts WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
