//! Orders, purchases and downloads

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};

use shared::models::{
    CartLine, Download, ItemType, Order, OrderLine, PaidAlbum, PaidTrack, PaymentMethod,
    merge_lines,
};

use super::shop::{PAID_ALBUM_SELECT, PAID_TRACK_SELECT};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    total: Decimal,
    is_paid: bool,
    payment_method: String,
    created_at: i64,
    paid_at: Option<i64>,
}

impl TryFrom<OrderRow> for Order {
    type Error = BoxError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: r.id,
            order_number: r.order_number,
            total: r.total,
            is_paid: r.is_paid,
            payment_method: r.payment_method.parse::<PaymentMethod>()?,
            created_at: r.created_at,
            paid_at: r.paid_at,
        })
    }
}

pub struct NewOrder<'a> {
    pub id: i64,
    pub user_id: &'a str,
    pub order_number: &'a str,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    /// `Some(paid_at)` for orders paid on creation
    pub paid_at: Option<i64>,
    pub now: i64,
}

/// Insert an order with its lines (same item lines merged)
pub async fn insert(
    conn: &mut PgConnection,
    order: NewOrder<'_>,
    lines: &[CartLine],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, order_number, total, is_paid, payment_method, created_at, paid_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.order_number)
    .bind(order.total)
    .bind(order.paid_at.is_some())
    .bind(order.payment_method.as_str())
    .bind(order.now)
    .bind(order.paid_at)
    .execute(&mut *conn)
    .await?;

    let merged = merge_lines(lines);
    for (item_type, sql) in [
        (
            ItemType::Track,
            "INSERT INTO ordered_tracks (order_id, paid_track_id, quantity, price)
             SELECT $1, * FROM UNNEST($2::bigint[], $3::int[], $4::numeric[])",
        ),
        (
            ItemType::Album,
            "INSERT INTO ordered_albums (order_id, paid_album_id, quantity, price)
             SELECT $1, * FROM UNNEST($2::bigint[], $3::int[], $4::numeric[])",
        ),
    ] {
        let of_type: Vec<&CartLine> = merged.iter().filter(|l| l.item_type == item_type).collect();
        if of_type.is_empty() {
            continue;
        }
        let ids: Vec<i64> = of_type.iter().map(|l| l.item_id).collect();
        let quantities: Vec<i32> = of_type.iter().map(|l| l.quantity).collect();
        let prices: Vec<Decimal> = of_type.iter().map(|l| l.price).collect();
        sqlx::query(sql)
            .bind(order.id)
            .bind(&ids)
            .bind(&quantities)
            .bind(&prices)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Mark the user's unpaid order as paid, if its total matches.
///
/// `false` if no such unpaid order exists (unknown, already paid or amount mismatch).
pub async fn mark_paid(
    executor: impl PgExecutor<'_>,
    order_number: &str,
    user_id: &str,
    total: Decimal,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET is_paid = TRUE, paid_at = $1
         WHERE order_number = $2 AND user_id = $3 AND total = $4 AND NOT is_paid",
    )
    .bind(now)
    .bind(order_number)
    .bind(user_id)
    .bind(total)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(pool: &PgPool, user_id: &str) -> Result<Vec<Order>, BoxError> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        "SELECT id, order_number, total, is_paid, payment_method, created_at, paid_at
         FROM orders WHERE user_id = $1
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// The user's order; another user's order is reported as missing
pub async fn find(pool: &PgPool, user_id: &str, id: i64) -> Result<Option<Order>, BoxError> {
    let row: Option<OrderRow> = sqlx::query_as(
        "SELECT id, order_number, total, is_paid, payment_method, created_at, paid_at
         FROM orders WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

#[derive(sqlx::FromRow)]
struct LineRow {
    item_id: i64,
    item_type: String,
    name: String,
    quantity: i32,
    price: Decimal,
}

pub async fn lines(pool: &PgPool, order_id: i64) -> Result<Vec<OrderLine>, BoxError> {
    let rows: Vec<LineRow> = sqlx::query_as(
        "SELECT ot.paid_track_id AS item_id, 'track' AS item_type, pt.name, ot.quantity, ot.price
         FROM ordered_tracks ot
         JOIN paid_tracks pt ON pt.id = ot.paid_track_id
         WHERE ot.order_id = $1
         UNION ALL
         SELECT oa.paid_album_id, 'album', pa.name, oa.quantity, oa.price
         FROM ordered_albums oa
         JOIN paid_albums pa ON pa.id = oa.paid_album_id
         WHERE oa.order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| -> Result<OrderLine, BoxError> {
            Ok(OrderLine {
                item_id: r.item_id,
                item_type: r.item_type.parse::<ItemType>()?,
                name: r.name,
                quantity: r.quantity,
                price: r.price,
            })
        })
        .collect()
}

// ── Purchases ──

const PAID_ORDER_TRACKS: &str = "SELECT ot.paid_track_id FROM ordered_tracks ot
    JOIN orders o ON o.id = ot.order_id
    WHERE o.user_id = $1 AND o.is_paid";

const PAID_ORDER_ALBUMS: &str = "SELECT oa.paid_album_id FROM ordered_albums oa
    JOIN orders o ON o.id = oa.order_id
    WHERE o.user_id = $1 AND o.is_paid";

/// Only confirmed (paid) orders count
pub async fn has_purchased(
    pool: &PgPool,
    user_id: &str,
    item_type: ItemType,
    item_id: i64,
) -> Result<bool, sqlx::Error> {
    let purchased = match item_type {
        ItemType::Track => PAID_ORDER_TRACKS,
        ItemType::Album => PAID_ORDER_ALBUMS,
    };
    sqlx::query_scalar(&format!("SELECT $2 IN ({purchased})"))
        .bind(user_id)
        .bind(item_id)
        .fetch_one(pool)
        .await
}

pub async fn purchased_tracks(pool: &PgPool, user_id: &str) -> Result<Vec<PaidTrack>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_TRACK_SELECT} WHERE p.id IN ({PAID_ORDER_TRACKS}) ORDER BY p.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn purchased_albums(pool: &PgPool, user_id: &str) -> Result<Vec<PaidAlbum>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_ALBUM_SELECT} WHERE p.id IN ({PAID_ORDER_ALBUMS}) ORDER BY p.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

// ── Downloads ──

pub async fn track_download(pool: &PgPool, track_id: i64) -> Result<Option<Download>, sqlx::Error> {
    sqlx::query_as("SELECT name, blob_url FROM paid_tracks WHERE id = $1")
        .bind(track_id)
        .fetch_optional(pool)
        .await
}

pub async fn album_downloads(pool: &PgPool, album_id: i64) -> Result<Vec<Download>, sqlx::Error> {
    sqlx::query_as(
        "SELECT name, blob_url FROM paid_album_tracks WHERE paid_album_id = $1 ORDER BY id",
    )
    .bind(album_id)
    .fetch_all(pool)
    .await
}

/// Every file of an order: its tracks and the tracks of its albums
pub async fn order_downloads(pool: &PgPool, order_id: i64) -> Result<Vec<Download>, sqlx::Error> {
    sqlx::query_as(
        "SELECT pt.name, pt.blob_url
         FROM ordered_tracks ot
         JOIN paid_tracks pt ON pt.id = ot.paid_track_id
         WHERE ot.order_id = $1
         UNION ALL
         SELECT pat.name, pat.blob_url
         FROM ordered_albums oa
         JOIN paid_album_tracks pat ON pat.paid_album_id = oa.paid_album_id
         WHERE oa.order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}
