//! Artist profiles and their requests to join studios

use sqlx::{PgExecutor, PgPool};

use shared::models::{Artist, ArtistProfile, ArtistRequest, Role};

use super::users;

const ARTIST_SELECT: &str = "SELECT a.id, a.user_id, a.name, a.description, a.img, a.studio_id,
        s.name AS studio_name
    FROM artists a
    LEFT JOIN studios s ON s.id = a.studio_id";

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Artist>, sqlx::Error> {
    sqlx::query_as(&format!("{ARTIST_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_user(pool: &PgPool, user_id: &str) -> Result<Option<Artist>, sqlx::Error> {
    sqlx::query_as(&format!("{ARTIST_SELECT} WHERE a.user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Artist>, sqlx::Error> {
    sqlx::query_as(&format!("{ARTIST_SELECT} ORDER BY a.name"))
        .fetch_all(pool)
        .await
}

pub async fn list_by_studio(pool: &PgPool, studio_id: i64) -> Result<Vec<Artist>, sqlx::Error> {
    sqlx::query_as(&format!("{ARTIST_SELECT} WHERE a.studio_id = $1 ORDER BY a.name"))
        .bind(studio_id)
        .fetch_all(pool)
        .await
}

/// Create the user's artist profile and grant `artist`. `false` if one exists.
pub async fn create(
    pool: &PgPool,
    id: i64,
    user_id: &str,
    profile: &ArtistProfile,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let inserted = sqlx::query(
        "INSERT INTO artists (id, user_id, name, description, img)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(id)
    .bind(user_id)
    .bind(&profile.name)
    .bind(&profile.description)
    .bind(&profile.img)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Ok(false);
    }
    users::grant_role(&mut *tx, user_id, Role::Artist).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn update(pool: &PgPool, id: i64, profile: &ArtistProfile) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE artists SET name = $1, description = $2, img = $3 WHERE id = $4")
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(&profile.img)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete the profile and revoke `artist`. Tracks and albums stay, detached.
pub async fn delete(pool: &PgPool, id: i64, user_id: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM artists WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    users::revoke_role(&mut *tx, user_id, Role::Artist).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn set_studio(
    executor: impl PgExecutor<'_>,
    artist_id: i64,
    studio_id: Option<i64>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE artists SET studio_id = $1 WHERE id = $2")
        .bind(studio_id)
        .bind(artist_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Detach an artist from a studio. `false` if the artist was not in it.
pub async fn remove_from_studio(
    pool: &PgPool,
    artist_id: i64,
    studio_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE artists SET studio_id = NULL WHERE id = $1 AND studio_id = $2")
        .bind(artist_id)
        .bind(studio_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Join requests ──

/// `false` if the artist already asked this studio
pub async fn create_request(
    pool: &PgPool,
    id: i64,
    studio_id: i64,
    artist_id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO artist_requests (id, studio_id, artist_id, created_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (studio_id, artist_id) DO NOTHING",
    )
    .bind(id)
    .bind(studio_id)
    .bind(artist_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_requests(
    pool: &PgPool,
    studio_id: i64,
) -> Result<Vec<ArtistRequest>, sqlx::Error> {
    sqlx::query_as(
        "SELECT r.id, r.studio_id, r.artist_id, a.name AS artist_name, r.created_at
         FROM artist_requests r
         JOIN artists a ON a.id = r.artist_id
         WHERE r.studio_id = $1
         ORDER BY r.created_at",
    )
    .bind(studio_id)
    .fetch_all(pool)
    .await
}

/// Consume a request and sign the artist to the studio.
///
/// Returns the artist id, `None` if the request does not exist. All other
/// pending requests of the artist are dropped.
pub async fn accept_request(
    pool: &PgPool,
    request_id: i64,
    studio_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let artist_id: Option<i64> = sqlx::query_scalar(
        "DELETE FROM artist_requests WHERE id = $1 AND studio_id = $2 RETURNING artist_id",
    )
    .bind(request_id)
    .bind(studio_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(artist_id) = artist_id else {
        return Ok(None);
    };

    set_studio(&mut *tx, artist_id, Some(studio_id)).await?;
    sqlx::query("DELETE FROM artist_requests WHERE artist_id = $1")
        .bind(artist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(artist_id))
}

/// `false` if there was no such request
pub async fn decline_request(
    pool: &PgPool,
    request_id: i64,
    studio_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM artist_requests WHERE id = $1 AND studio_id = $2")
        .bind(request_id)
        .bind(studio_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
