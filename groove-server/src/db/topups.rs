//! Balance top-ups paid through PayPal

use rust_decimal::Decimal;
use sqlx::PgExecutor;

/// Record a top-up for a PayPal order. `false` if that order was already credited.
pub async fn try_record(
    executor: impl PgExecutor<'_>,
    paypal_order_id: &str,
    user_id: &str,
    amount: Decimal,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO balance_topups (paypal_order_id, user_id, amount, created_at)
         VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
    )
    .bind(paypal_order_id)
    .bind(user_id)
    .bind(amount)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
