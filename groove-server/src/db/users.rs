//! Users and their roles

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use shared::models::{Role, UserSummary, parse_roles};

/// Serializes registrations so exactly one account becomes the first admin
const REGISTER_LOCK_KEY: i64 = 0x6772_6f6f_7665;

#[derive(sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub balance: Decimal,
    pub created_at: i64,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert a user with role `user` (plus `admin` for the very first account).
///
/// Returns `None` if the email is taken, otherwise the granted roles.
pub async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    email: &str,
    hashed_password: &str,
    balance: Decimal,
    now: i64,
) -> Result<Option<Vec<Role>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(REGISTER_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let is_first: bool = sqlx::query_scalar("SELECT NOT EXISTS (SELECT 1 FROM users)")
        .fetch_one(&mut *tx)
        .await?;

    let inserted = sqlx::query(
        "INSERT INTO users (id, name, email, hashed_password, balance, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .bind(balance)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Ok(None);
    }

    let mut roles = vec![Role::User];
    if is_first {
        roles.push(Role::Admin);
    }
    for role in &roles {
        grant_role(&mut *tx, id, *role).await?;
    }

    tx.commit().await?;
    Ok(Some(roles))
}

pub async fn update_password(
    pool: &PgPool,
    user_id: &str,
    hashed_password: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn balance(pool: &PgPool, user_id: &str) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar("SELECT balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Lock the user row for the rest of the transaction and return the balance
pub async fn lock_balance(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Subtract `amount` unless that would make the balance negative.
///
/// Returns the new balance, or `None` if funds were insufficient.
pub async fn debit(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    amount: Decimal,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE users SET balance = balance - $1
         WHERE id = $2 AND balance >= $1
         RETURNING balance",
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Returns the new balance, `None` if the user does not exist
pub async fn credit(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    amount: Decimal,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar("UPDATE users SET balance = balance + $1 WHERE id = $2 RETURNING balance")
        .bind(amount)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

// ── Roles ──

pub async fn roles(executor: impl PgExecutor<'_>, user_id: &str) -> Result<Vec<Role>, sqlx::Error> {
    let names: Vec<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(parse_roles(names))
}

pub async fn has_role(pool: &PgPool, user_id: &str, role: Role) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
    )
    .bind(user_id)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
}

pub async fn grant_role(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    role: Role,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(role.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn revoke_role(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    role: Role,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
        .bind(user_id)
        .bind(role.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Move `admin` from one user to another
pub async fn transfer_admin(pool: &PgPool, from: &str, to: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    grant_role(&mut *tx, to, Role::Admin).await?;
    revoke_role(&mut *tx, from, Role::Admin).await?;
    tx.commit().await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    email: String,
    balance: Decimal,
    created_at: i64,
    roles: Vec<String>,
}

/// All accounts with their roles, oldest first
pub async fn list_summaries(pool: &PgPool) -> Result<Vec<UserSummary>, sqlx::Error> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        "SELECT u.id, u.name, u.email, u.balance, u.created_at,
                COALESCE(array_agg(r.role) FILTER (WHERE r.role IS NOT NULL), '{}') AS roles
         FROM users u
         LEFT JOIN user_roles r ON r.user_id = u.id
         GROUP BY u.id
         ORDER BY u.created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| UserSummary {
            id: r.id,
            name: r.name,
            email: r.email,
            balance: r.balance,
            roles: parse_roles(r.roles),
            created_at: r.created_at,
        })
        .collect())
}
