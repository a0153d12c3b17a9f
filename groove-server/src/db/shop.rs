//! Paid catalog (shop)

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use shared::models::{AlbumTrackInput, ItemType, PaidAlbum, PaidAlbumTrack, PaidItemRemoval, PaidTrack};

pub(crate) const PAID_TRACK_SELECT: &str = "SELECT p.id, p.name, p.img, p.price,
        p.artist_id, ar.name AS artist_name,
        p.studio_id, s.name AS studio_name, p.is_visible
    FROM paid_tracks p
    LEFT JOIN artists ar ON ar.id = p.artist_id
    LEFT JOIN studios s ON s.id = p.studio_id";

pub(crate) const PAID_ALBUM_SELECT: &str = "SELECT p.id, p.name, p.description, p.img, p.price,
        p.artist_id, ar.name AS artist_name,
        p.studio_id, s.name AS studio_name, p.is_visible
    FROM paid_albums p
    LEFT JOIN artists ar ON ar.id = p.artist_id
    LEFT JOIN studios s ON s.id = p.studio_id";

/// Which rows a shop listing includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// What buyers see
    Public,
    /// Hidden items too (studio management)
    All,
}

impl Visibility {
    fn clause(self) -> &'static str {
        match self {
            Visibility::Public => " AND p.is_visible",
            Visibility::All => "",
        }
    }
}

// ── Paid tracks ──

pub async fn list_tracks(pool: &PgPool) -> Result<Vec<PaidTrack>, sqlx::Error> {
    sqlx::query_as(&format!("{PAID_TRACK_SELECT} WHERE p.is_visible ORDER BY p.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn find_track(pool: &PgPool, id: i64) -> Result<Option<PaidTrack>, sqlx::Error> {
    sqlx::query_as(&format!("{PAID_TRACK_SELECT} WHERE p.id = $1 AND p.is_visible"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn tracks_by_studio(
    pool: &PgPool,
    studio_id: i64,
    visibility: Visibility,
) -> Result<Vec<PaidTrack>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_TRACK_SELECT} WHERE p.studio_id = $1{} ORDER BY p.id DESC",
        visibility.clause()
    ))
    .bind(studio_id)
    .fetch_all(pool)
    .await
}

pub async fn tracks_by_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<PaidTrack>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_TRACK_SELECT} WHERE p.artist_id = $1 AND p.is_visible ORDER BY p.id DESC"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await
}

/// Studio a paid track belongs to. Outer `None`: no such track.
pub async fn track_studio(pool: &PgPool, id: i64) -> Result<Option<Option<i64>>, sqlx::Error> {
    sqlx::query_scalar("SELECT studio_id FROM paid_tracks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewPaidTrack<'a> {
    pub id: i64,
    pub name: &'a str,
    pub img: &'a str,
    pub blob_url: &'a str,
    pub price: Decimal,
    pub artist_id: Option<i64>,
    pub studio_id: i64,
}

pub async fn create_track(pool: &PgPool, track: NewPaidTrack<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO paid_tracks (id, name, img, blob_url, price, artist_id, studio_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(track.id)
    .bind(track.name)
    .bind(track.img)
    .bind(track.blob_url)
    .bind(track.price)
    .bind(track.artist_id)
    .bind(track.studio_id)
    .execute(pool)
    .await?;
    Ok(())
}

// ── Paid albums ──

pub async fn list_albums(pool: &PgPool) -> Result<Vec<PaidAlbum>, sqlx::Error> {
    sqlx::query_as(&format!("{PAID_ALBUM_SELECT} WHERE p.is_visible ORDER BY p.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn find_album(pool: &PgPool, id: i64) -> Result<Option<PaidAlbum>, sqlx::Error> {
    sqlx::query_as(&format!("{PAID_ALBUM_SELECT} WHERE p.id = $1 AND p.is_visible"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn albums_by_studio(
    pool: &PgPool,
    studio_id: i64,
    visibility: Visibility,
) -> Result<Vec<PaidAlbum>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_ALBUM_SELECT} WHERE p.studio_id = $1{} ORDER BY p.id DESC",
        visibility.clause()
    ))
    .bind(studio_id)
    .fetch_all(pool)
    .await
}

pub async fn albums_by_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<PaidAlbum>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{PAID_ALBUM_SELECT} WHERE p.artist_id = $1 AND p.is_visible ORDER BY p.id DESC"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await
}

pub async fn album_tracks(pool: &PgPool, album_id: i64) -> Result<Vec<PaidAlbumTrack>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, paid_album_id, name, img, artist_id
         FROM paid_album_tracks WHERE paid_album_id = $1 ORDER BY id",
    )
    .bind(album_id)
    .fetch_all(pool)
    .await
}

pub async fn album_studio(pool: &PgPool, id: i64) -> Result<Option<Option<i64>>, sqlx::Error> {
    sqlx::query_scalar("SELECT studio_id FROM paid_albums WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewPaidAlbum<'a> {
    pub id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub img: &'a str,
    pub price: Decimal,
    pub artist_id: Option<i64>,
    pub studio_id: i64,
    pub tracks: &'a [AlbumTrackInput],
}

pub async fn create_album(pool: &PgPool, album: NewPaidAlbum<'_>) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO paid_albums (id, name, description, img, price, artist_id, studio_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(album.id)
    .bind(album.name)
    .bind(album.description)
    .bind(album.img)
    .bind(album.price)
    .bind(album.artist_id)
    .bind(album.studio_id)
    .execute(&mut *tx)
    .await?;

    if !album.tracks.is_empty() {
        let ids: Vec<i64> = album
            .tracks
            .iter()
            .map(|_| shared::util::snowflake_id())
            .collect();
        let names: Vec<&str> = album.tracks.iter().map(|t| t.name.as_str()).collect();
        let imgs: Vec<&str> = album.tracks.iter().map(|t| t.img.as_str()).collect();
        let blob_urls: Vec<&str> = album.tracks.iter().map(|t| t.blob_url.as_str()).collect();
        sqlx::query(
            "INSERT INTO paid_album_tracks (id, paid_album_id, name, img, blob_url, artist_id)
             SELECT t.id, $5, t.name, t.img, t.blob_url, $6
             FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::text[])
                 AS t(id, name, img, blob_url)",
        )
        .bind(&ids)
        .bind(&names)
        .bind(&imgs)
        .bind(&blob_urls)
        .bind(album.id)
        .bind(album.artist_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

// ── Cart pricing and removal ──

/// Name and current price of a visible paid item
pub async fn visible_price(
    executor: impl PgExecutor<'_>,
    item_type: ItemType,
    id: i64,
) -> Result<Option<(String, Decimal)>, sqlx::Error> {
    let sql = match item_type {
        ItemType::Track => "SELECT name, price FROM paid_tracks WHERE id = $1 AND is_visible",
        ItemType::Album => "SELECT name, price FROM paid_albums WHERE id = $1 AND is_visible",
    };
    sqlx::query_as(sql).bind(id).fetch_optional(executor).await
}

/// Remove a paid item from the shop.
///
/// Items referenced by any order are only hidden so buyers keep their
/// downloads. Others are deleted. Either way, cart lines pointing at the
/// item are dropped.
/// Returns `None` if the item does not exist.
pub async fn remove_item(
    pool: &PgPool,
    item_type: ItemType,
    id: i64,
) -> Result<Option<PaidItemRemoval>, sqlx::Error> {
    let (lock_sql, ordered_sql, hide_sql, delete_sql) = match item_type {
        ItemType::Track => (
            "SELECT id FROM paid_tracks WHERE id = $1 FOR UPDATE",
            "SELECT EXISTS (SELECT 1 FROM ordered_tracks WHERE paid_track_id = $1)",
            "UPDATE paid_tracks SET is_visible = FALSE WHERE id = $1",
            "DELETE FROM paid_tracks WHERE id = $1",
        ),
        ItemType::Album => (
            "SELECT id FROM paid_albums WHERE id = $1 FOR UPDATE",
            "SELECT EXISTS (SELECT 1 FROM ordered_albums WHERE paid_album_id = $1)",
            "UPDATE paid_albums SET is_visible = FALSE WHERE id = $1",
            "DELETE FROM paid_albums WHERE id = $1",
        ),
    };

    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar(lock_sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let ordered: bool = sqlx::query_scalar(ordered_sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM cart_items WHERE item_type = $1 AND item_id = $2")
        .bind(item_type.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let outcome = if ordered {
        sqlx::query(hide_sql).bind(id).execute(&mut *tx).await?;
        PaidItemRemoval::Hidden
    } else {
        sqlx::query(delete_sql).bind(id).execute(&mut *tx).await?;
        PaidItemRemoval::Deleted
    };

    tx.commit().await?;
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{carts, fixtures, orders};

    #[sqlx::test(migrations = "./migrations")]
    async fn test_removing_purchased_track_hides_it(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "9.99").await;
        fixtures::user(&pool, "buyer1", "0").await;
        fixtures::user(&pool, "buyer2", "0").await;
        fixtures::paid_order(&pool, "buyer1", track, "9.99").await;
        fixtures::cart_track(&pool, "buyer2", track, 2, "9.99").await;

        let outcome = remove_item(&pool, ItemType::Track, track).await.unwrap();
        assert_eq!(outcome, Some(PaidItemRemoval::Hidden));

        // Gone from the shop and from every cart
        assert!(find_track(&pool, track).await.unwrap().is_none());
        assert!(visible_price(&pool, ItemType::Track, track).await.unwrap().is_none());
        assert!(carts::lines(&pool, "buyer2").await.unwrap().is_empty());

        // The buyer keeps it
        let purchased = orders::purchased_tracks(&pool, "buyer1").await.unwrap();
        assert_eq!(purchased.len(), 1);
        assert!(!purchased[0].is_visible);
        assert!(orders::track_download(&pool, track).await.unwrap().is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_removing_unsold_track_deletes_it(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "demo", "1.00").await;
        fixtures::user(&pool, "buyer", "0").await;
        fixtures::cart_track(&pool, "buyer", track, 1, "1.00").await;

        let outcome = remove_item(&pool, ItemType::Track, track).await.unwrap();
        assert_eq!(outcome, Some(PaidItemRemoval::Deleted));
        assert_eq!(track_studio(&pool, track).await.unwrap(), None);
        assert!(carts::lines(&pool, "buyer").await.unwrap().is_empty());

        assert_eq!(remove_item(&pool, ItemType::Track, track).await.unwrap(), None);
    }
}
