//! Seed helpers for database tests

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::models::{CartLine, ItemType, PaymentMethod, StudioProfile};
use shared::util::snowflake_id;

use super::orders::{self, NewOrder};
use super::{carts, catalog, shop, studios, users};
use crate::error::ServiceError;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn user(pool: &PgPool, id: &str, balance: &str) {
    users::create(pool, id, id, &format!("{id}@example.com"), "hash", dec(balance), 0)
        .await
        .unwrap()
        .unwrap();
}

/// A studio owned by a fresh user
pub async fn studio(pool: &PgPool, owner: &str) -> i64 {
    user(pool, owner, "0").await;
    let id = snowflake_id();
    let profile = StudioProfile {
        name: format!("{owner} records"),
        localization: String::new(),
        img: String::new(),
        address_url: String::new(),
    };
    assert!(studios::create(pool, id, owner, &profile, 0).await.unwrap());
    id
}

pub async fn paid_track(pool: &PgPool, studio_id: i64, name: &str, price: &str) -> i64 {
    let id = snowflake_id();
    shop::create_track(
        pool,
        shop::NewPaidTrack {
            id,
            name,
            img: "",
            blob_url: &format!("https://files.example.com/{name}.mp3"),
            price: dec(price),
            artist_id: None,
            studio_id,
        },
    )
    .await
    .unwrap();
    id
}

pub async fn free_track(pool: &PgPool, name: &str) -> i64 {
    let id = snowflake_id();
    catalog::create_track(
        pool,
        catalog::NewTrack {
            id,
            name,
            img: "",
            blob_url: &format!("https://files.example.com/{name}.mp3"),
            artist_id: None,
            album_id: None,
            studio_id: None,
        },
    )
    .await
    .unwrap();
    id
}

/// Put `quantity` of a paid track into the user's cart at `price`
pub async fn cart_track(pool: &PgPool, user_id: &str, track_id: i64, quantity: i32, price: &str) {
    let cart_id = carts::get_or_create(pool, user_id, 0).await.unwrap();
    carts::add_item(pool, cart_id, ItemType::Track, track_id, quantity, dec(price))
        .await
        .unwrap()
        .unwrap();
}

/// A balance-paid order of one paid track
pub async fn paid_order(pool: &PgPool, user_id: &str, track_id: i64, price: &str) {
    let line = CartLine {
        item_id: track_id,
        item_type: ItemType::Track,
        name: String::new(),
        quantity: 1,
        price: dec(price),
    };
    let id = snowflake_id();
    let mut conn = pool.acquire().await.unwrap();
    orders::insert(
        &mut conn,
        NewOrder {
            id,
            user_id,
            order_number: &format!("GRV-{id}"),
            total: dec(price),
            payment_method: PaymentMethod::Balance,
            paid_at: Some(0),
            now: 0,
        },
        &[line],
    )
    .await
    .unwrap();
}

pub fn code(err: ServiceError) -> ErrorCode {
    AppError::from(err).code
}
