//! Studios and their admins

use sqlx::PgPool;

use shared::models::{Role, Studio, StudioAdmin, StudioProfile};

use super::users;

const STUDIO_SELECT: &str =
    "SELECT id, owner_id, name, localization, img, address_url, created_at FROM studios";

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Studio>, sqlx::Error> {
    sqlx::query_as(&format!("{STUDIO_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Studio>, sqlx::Error> {
    sqlx::query_as(&format!("{STUDIO_SELECT} ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_owner(pool: &PgPool, user_id: &str) -> Result<Option<Studio>, sqlx::Error> {
    sqlx::query_as(&format!("{STUDIO_SELECT} WHERE owner_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Studio the user owns or administers
pub async fn managed_by(pool: &PgPool, user_id: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM studios WHERE owner_id = $1
         UNION
         SELECT studio_id FROM studio_admins WHERE user_id = $1
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Create a studio owned by the user and grant `studiohead`.
///
/// `false` if the user already owns or administers a studio.
pub async fn create(
    pool: &PgPool,
    id: i64,
    owner_id: &str,
    profile: &StudioProfile,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let is_admin: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM studio_admins WHERE user_id = $1)")
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;
    if is_admin {
        return Ok(false);
    }

    let inserted = sqlx::query(
        "INSERT INTO studios (id, owner_id, name, localization, img, address_url, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (owner_id) DO NOTHING",
    )
    .bind(id)
    .bind(owner_id)
    .bind(&profile.name)
    .bind(&profile.localization)
    .bind(&profile.img)
    .bind(&profile.address_url)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Ok(false);
    }

    users::grant_role(&mut *tx, owner_id, Role::StudioHead).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn update(pool: &PgPool, id: i64, profile: &StudioProfile) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE studios SET name = $1, localization = $2, img = $3, address_url = $4
         WHERE id = $5",
    )
    .bind(&profile.name)
    .bind(&profile.localization)
    .bind(&profile.img)
    .bind(&profile.address_url)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a studio.
///
/// Artists are detached, free items published by the studio are deleted,
/// paid items are hidden (their orders keep referencing them) and dropped
/// from every cart, admins lose
/// `studioadmin` and the owner loses `studiohead`.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let owner_id: Option<String> =
        sqlx::query_scalar("SELECT owner_id FROM studios WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(owner_id) = owner_id else {
        return Ok(false);
    };

    let admin_ids: Vec<String> =
        sqlx::query_scalar("DELETE FROM studio_admins WHERE studio_id = $1 RETURNING user_id")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
    if !admin_ids.is_empty() {
        sqlx::query("DELETE FROM user_roles WHERE role = $1 AND user_id = ANY($2)")
            .bind(Role::StudioAdmin.as_str())
            .bind(&admin_ids)
            .execute(&mut *tx)
            .await?;
    }
    users::revoke_role(&mut *tx, &owner_id, Role::StudioHead).await?;

    for sql in [
        "UPDATE artists SET studio_id = NULL WHERE studio_id = $1",
        "DELETE FROM cart_items WHERE item_type = 'track'
         AND item_id IN (SELECT id FROM paid_tracks WHERE studio_id = $1)",
        "DELETE FROM cart_items WHERE item_type = 'album'
         AND item_id IN (SELECT id FROM paid_albums WHERE studio_id = $1)",
        "UPDATE paid_tracks SET is_visible = FALSE WHERE studio_id = $1",
        "UPDATE paid_albums SET is_visible = FALSE WHERE studio_id = $1",
        "DELETE FROM tracks WHERE studio_id = $1",
        "DELETE FROM albums WHERE studio_id = $1",
        "DELETE FROM studios WHERE id = $1",
    ] {
        sqlx::query(sql).bind(id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(true)
}

// ── Admins ──

pub async fn list_admins(pool: &PgPool, studio_id: i64) -> Result<Vec<StudioAdmin>, sqlx::Error> {
    sqlx::query_as(
        "SELECT u.id AS user_id, u.name, u.email
         FROM studio_admins sa
         JOIN users u ON u.id = sa.user_id
         WHERE sa.studio_id = $1
         ORDER BY u.name",
    )
    .bind(studio_id)
    .fetch_all(pool)
    .await
}

/// `false` if the user already administers the studio
pub async fn add_admin(pool: &PgPool, studio_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let inserted = sqlx::query(
        "INSERT INTO studio_admins (studio_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(studio_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Ok(false);
    }
    users::grant_role(&mut *tx, user_id, Role::StudioAdmin).await?;
    tx.commit().await?;
    Ok(true)
}

/// `false` if the user was not an admin of the studio
pub async fn remove_admin(
    pool: &PgPool,
    studio_id: i64,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let deleted = sqlx::query("DELETE FROM studio_admins WHERE studio_id = $1 AND user_id = $2")
        .bind(studio_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Ok(false);
    }
    users::revoke_role(&mut *tx, user_id, Role::StudioAdmin).await?;
    tx.commit().await?;
    Ok(true)
}

/// Hand the studio to one of its admins; the old owner becomes an admin.
///
/// `false` if `new_owner` is not an admin of the studio.
pub async fn transfer_ownership(
    pool: &PgPool,
    studio_id: i64,
    old_owner: &str,
    new_owner: &str,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let was_admin = sqlx::query("DELETE FROM studio_admins WHERE studio_id = $1 AND user_id = $2")
        .bind(studio_id)
        .bind(new_owner)
        .execute(&mut *tx)
        .await?;
    if was_admin.rows_affected() == 0 {
        return Ok(false);
    }

    let moved = sqlx::query("UPDATE studios SET owner_id = $1 WHERE id = $2 AND owner_id = $3")
        .bind(new_owner)
        .bind(studio_id)
        .bind(old_owner)
        .execute(&mut *tx)
        .await?;
    if moved.rows_affected() == 0 {
        return Ok(false);
    }
    sqlx::query("INSERT INTO studio_admins (studio_id, user_id) VALUES ($1, $2)")
        .bind(studio_id)
        .bind(old_owner)
        .execute(&mut *tx)
        .await?;

    users::revoke_role(&mut *tx, new_owner, Role::StudioAdmin).await?;
    users::grant_role(&mut *tx, new_owner, Role::StudioHead).await?;
    users::revoke_role(&mut *tx, old_owner, Role::StudioHead).await?;
    users::grant_role(&mut *tx, old_owner, Role::StudioAdmin).await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{carts, fixtures, orders, shop};
    use shared::models::ItemType;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleting_studio_withdraws_its_paid_items(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let sold = fixtures::paid_track(&pool, studio_id, "sold", "2.00").await;
        let unsold = fixtures::paid_track(&pool, studio_id, "unsold", "3.00").await;
        fixtures::user(&pool, "buyer1", "0").await;
        fixtures::user(&pool, "buyer2", "0").await;
        fixtures::paid_order(&pool, "buyer1", sold, "2.00").await;
        fixtures::cart_track(&pool, "buyer2", sold, 1, "2.00").await;
        fixtures::cart_track(&pool, "buyer2", unsold, 1, "3.00").await;

        assert!(delete(&pool, studio_id).await.unwrap());

        assert!(find(&pool, studio_id).await.unwrap().is_none());
        assert!(carts::lines(&pool, "buyer2").await.unwrap().is_empty());
        assert!(shop::visible_price(&pool, ItemType::Track, unsold).await.unwrap().is_none());
        assert_eq!(orders::purchased_tracks(&pool, "buyer1").await.unwrap().len(), 1);
        assert!(!users::has_role(&pool, "owner", Role::StudioHead).await.unwrap());

        assert!(!delete(&pool, studio_id).await.unwrap());
    }
}
