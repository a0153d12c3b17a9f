//! Site-wide settings (single row)

use sqlx::PgPool;

use shared::models::{AppInfo, AppInfoUpdate};

pub async fn get(pool: &PgPool) -> Result<AppInfo, sqlx::Error> {
    sqlx::query_as("SELECT name, img, is_closed FROM app_settings WHERE id = 1")
        .fetch_one(pool)
        .await
}

pub async fn update(pool: &PgPool, update: &AppInfoUpdate) -> Result<AppInfo, sqlx::Error> {
    sqlx::query_as(
        "UPDATE app_settings SET name = $1, img = $2 WHERE id = 1
         RETURNING name, img, is_closed",
    )
    .bind(&update.name)
    .bind(&update.img)
    .fetch_one(pool)
    .await
}

pub async fn set_closed(pool: &PgPool, is_closed: bool) -> Result<AppInfo, sqlx::Error> {
    sqlx::query_as(
        "UPDATE app_settings SET is_closed = $1 WHERE id = 1
         RETURNING name, img, is_closed",
    )
    .bind(is_closed)
    .fetch_one(pool)
    .await
}
