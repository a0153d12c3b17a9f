//! Postal details of users

use sqlx::PgPool;

use shared::models::UserInformation;

pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<UserInformation>, sqlx::Error> {
    sqlx::query_as(
        "SELECT street, city, postal_code, country FROM user_information WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    info: &UserInformation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_information (user_id, street, city, postal_code, country)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id) DO UPDATE SET
            street = EXCLUDED.street, city = EXCLUDED.city,
            postal_code = EXCLUDED.postal_code, country = EXCLUDED.country",
    )
    .bind(user_id)
    .bind(&info.street)
    .bind(&info.city)
    .bind(&info.postal_code)
    .bind(&info.country)
    .execute(pool)
    .await?;
    Ok(())
}
