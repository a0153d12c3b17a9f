//! Free catalog: tracks and albums

use sqlx::PgPool;

use shared::models::{Album, AlbumTrackInput, Track};

pub(crate) const TRACK_SELECT: &str = "SELECT t.id, t.name, t.img, t.blob_url,
        t.artist_id, ar.name AS artist_name,
        t.album_id, al.name AS album_name,
        t.studio_id, s.name AS studio_name
    FROM tracks t
    LEFT JOIN artists ar ON ar.id = t.artist_id
    LEFT JOIN albums al ON al.id = t.album_id
    LEFT JOIN studios s ON s.id = t.studio_id";

pub(crate) const ALBUM_SELECT: &str = "SELECT al.id, al.name, al.description, al.img,
        al.artist_id, ar.name AS artist_name,
        al.studio_id, s.name AS studio_name
    FROM albums al
    LEFT JOIN artists ar ON ar.id = al.artist_id
    LEFT JOIN studios s ON s.id = al.studio_id";

/// Owner columns of a free item, used for permission checks
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ItemOwner {
    pub artist_id: Option<i64>,
    pub studio_id: Option<i64>,
}

/// Column a listing is filtered by
#[derive(Debug, Clone, Copy)]
pub enum By {
    Artist(i64),
    Album(i64),
    Studio(i64),
}

impl By {
    fn condition(&self, alias: &str) -> (String, i64) {
        match *self {
            By::Artist(id) => (format!("{alias}.artist_id = $1"), id),
            By::Album(id) => (format!("{alias}.album_id = $1"), id),
            By::Studio(id) => (format!("{alias}.studio_id = $1"), id),
        }
    }
}

// ── Tracks ──

pub async fn list_tracks(pool: &PgPool) -> Result<Vec<Track>, sqlx::Error> {
    sqlx::query_as(&format!("{TRACK_SELECT} ORDER BY t.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn tracks_by(pool: &PgPool, by: By) -> Result<Vec<Track>, sqlx::Error> {
    let (condition, id) = by.condition("t");
    sqlx::query_as(&format!("{TRACK_SELECT} WHERE {condition} ORDER BY t.id"))
        .bind(id)
        .fetch_all(pool)
        .await
}

pub async fn find_track(pool: &PgPool, id: i64) -> Result<Option<Track>, sqlx::Error> {
    sqlx::query_as(&format!("{TRACK_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn track_owner(pool: &PgPool, id: i64) -> Result<Option<ItemOwner>, sqlx::Error> {
    sqlx::query_as("SELECT artist_id, studio_id FROM tracks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewTrack<'a> {
    pub id: i64,
    pub name: &'a str,
    pub img: &'a str,
    pub blob_url: &'a str,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub studio_id: Option<i64>,
}

pub async fn create_track(pool: &PgPool, track: NewTrack<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tracks (id, name, img, blob_url, artist_id, album_id, studio_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(track.id)
    .bind(track.name)
    .bind(track.img)
    .bind(track.blob_url)
    .bind(track.artist_id)
    .bind(track.album_id)
    .bind(track.studio_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_track(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Move a track into an album, or out of any album with `None`
pub async fn set_track_album(
    pool: &PgPool,
    track_id: i64,
    album_id: Option<i64>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tracks SET album_id = $1 WHERE id = $2")
        .bind(album_id)
        .bind(track_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ── Albums ──

pub async fn list_albums(pool: &PgPool) -> Result<Vec<Album>, sqlx::Error> {
    sqlx::query_as(&format!("{ALBUM_SELECT} ORDER BY al.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn albums_by(pool: &PgPool, by: By) -> Result<Vec<Album>, sqlx::Error> {
    let (condition, id) = by.condition("al");
    sqlx::query_as(&format!("{ALBUM_SELECT} WHERE {condition} ORDER BY al.id"))
        .bind(id)
        .fetch_all(pool)
        .await
}

pub async fn find_album(pool: &PgPool, id: i64) -> Result<Option<Album>, sqlx::Error> {
    sqlx::query_as(&format!("{ALBUM_SELECT} WHERE al.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn album_owner(pool: &PgPool, id: i64) -> Result<Option<ItemOwner>, sqlx::Error> {
    sqlx::query_as("SELECT artist_id, studio_id FROM albums WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewAlbum<'a> {
    pub id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub img: &'a str,
    pub artist_id: Option<i64>,
    pub studio_id: Option<i64>,
    pub tracks: &'a [AlbumTrackInput],
}

/// Insert an album together with its tracks
pub async fn create_album(pool: &PgPool, album: NewAlbum<'_>) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO albums (id, name, description, img, artist_id, studio_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(album.id)
    .bind(album.name)
    .bind(album.description)
    .bind(album.img)
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
            "INSERT INTO tracks (id, name, img, blob_url, artist_id, album_id, studio_id)
             SELECT t.id, t.name, t.img, t.blob_url, $5, $6, $7
             FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::text[])
                 AS t(id, name, img, blob_url)",
        )
        .bind(&ids)
        .bind(&names)
        .bind(&imgs)
        .bind(&blob_urls)
        .bind(album.artist_id)
        .bind(album.id)
        .bind(album.studio_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Delete an album; its tracks stay as singles
pub async fn delete_album(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM albums WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
