//! Track and album likes

use sqlx::PgPool;

use shared::models::{Album, Track};

use super::catalog::{ALBUM_SELECT, TRACK_SELECT};

/// `false` if the like already existed
pub async fn like_track(pool: &PgPool, user_id: &str, track_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO track_likes (user_id, track_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(track_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// `false` if there was no like
pub async fn unlike_track(pool: &PgPool, user_id: &str, track_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM track_likes WHERE user_id = $1 AND track_id = $2")
        .bind(user_id)
        .bind(track_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn liked_tracks(pool: &PgPool, user_id: &str) -> Result<Vec<Track>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{TRACK_SELECT} JOIN track_likes l ON l.track_id = t.id WHERE l.user_id = $1 ORDER BY t.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn like_album(pool: &PgPool, user_id: &str, album_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO album_likes (user_id, album_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(album_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn unlike_album(pool: &PgPool, user_id: &str, album_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM album_likes WHERE user_id = $1 AND album_id = $2")
        .bind(user_id)
        .bind(album_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn liked_albums(pool: &PgPool, user_id: &str) -> Result<Vec<Album>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{ALBUM_SELECT} JOIN album_likes l ON l.album_id = al.id WHERE l.user_id = $1 ORDER BY al.name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_liking_twice_changes_nothing(pool: PgPool) {
        fixtures::user(&pool, "fan", "0").await;
        let track = fixtures::free_track(&pool, "tune").await;

        assert!(like_track(&pool, "fan", track).await.unwrap());
        assert!(!like_track(&pool, "fan", track).await.unwrap());
        assert_eq!(liked_tracks(&pool, "fan").await.unwrap().len(), 1);

        assert!(unlike_track(&pool, "fan", track).await.unwrap());
        assert!(!unlike_track(&pool, "fan", track).await.unwrap());
        assert!(liked_tracks(&pool, "fan").await.unwrap().is_empty());
    }
}
