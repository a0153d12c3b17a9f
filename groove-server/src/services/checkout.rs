//! Checkout and payment confirmation
//!
//! Every money movement runs in a single transaction. The balance debit is
//! guarded in SQL so a balance never goes negative, and PayPal confirmations
//! are keyed by the PayPal order id so they apply at most once.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::models::{BalanceCheckout, PaymentMethod, PaypalCheckout, cart_total};
use shared::money::validate_top_up;
use shared::util::{now_millis, order_number, snowflake_id};

use crate::db::orders::{self, NewOrder};
use crate::db::{carts, topups, users};
use crate::error::ServiceResult;
use crate::paypal::{CustomId, PayPalClient};

fn insufficient_balance(balance: Decimal, total: Decimal) -> AppError {
    AppError::new(ErrorCode::InsufficientBalance)
        .with_detail("balance", balance.to_string())
        .with_detail("total", total.to_string())
}

/// Pay the whole cart with the account balance
pub async fn pay_by_balance(pool: &PgPool, user_id: &str) -> ServiceResult<BalanceCheckout> {
    let mut tx = pool.begin().await?;

    let balance = users::lock_balance(&mut *tx, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let lines = carts::lines(&mut *tx, user_id).await?;
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }

    let total = cart_total(&lines);
    if balance < total {
        return Err(insufficient_balance(balance, total).into());
    }

    let now = now_millis();
    let order_id = snowflake_id();
    let number = order_number();
    orders::insert(
        &mut tx,
        NewOrder {
            id: order_id,
            user_id,
            order_number: &number,
            total,
            payment_method: PaymentMethod::Balance,
            paid_at: Some(now),
            now,
        },
        &lines,
    )
    .await?;

    let new_balance = users::debit(&mut *tx, user_id, total)
        .await?
        .ok_or_else(|| insufficient_balance(balance, total))?;

    carts::clear(&mut *tx, user_id).await?;
    tx.commit().await?;

    tracing::info!(user_id, order_number = %number, %total, "Cart paid with balance");
    Ok(BalanceCheckout {
        order_id,
        order_number: number,
        total,
        balance: new_balance,
    })
}

/// Create a PayPal order for the cart and record it as unpaid.
///
/// The cart stays until the webhook confirms the payment.
pub async fn start_paypal_cart_payment(
    pool: &PgPool,
    paypal: &PayPalClient,
    user_id: &str,
) -> ServiceResult<PaypalCheckout> {
    let lines = carts::lines(pool, user_id).await?;
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }
    let total = cart_total(&lines);

    let custom_id = CustomId::CartPayment {
        amount: total,
        user_id: user_id.to_string(),
    };
    let created = paypal.create_order(total, &custom_id).await?;

    let mut tx = pool.begin().await?;
    orders::insert(
        &mut tx,
        NewOrder {
            id: snowflake_id(),
            user_id,
            order_number: &created.id,
            total,
            payment_method: PaymentMethod::Paypal,
            paid_at: None,
            now: now_millis(),
        },
        &lines,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id, paypal_order_id = %created.id, %total, "PayPal cart payment started");
    Ok(PaypalCheckout {
        order_id: created.id,
        approval_url: created.approval_url,
    })
}

/// Create a PayPal order that tops up the balance once captured
pub async fn start_paypal_top_up(
    paypal: &PayPalClient,
    user_id: &str,
    amount: Decimal,
) -> ServiceResult<PaypalCheckout> {
    let amount = validate_top_up(amount)?;
    let custom_id = CustomId::AddBalance {
        amount,
        user_id: user_id.to_string(),
    };
    let created = paypal.create_order(amount, &custom_id).await?;

    tracing::info!(user_id, paypal_order_id = %created.id, %amount, "PayPal top-up started");
    Ok(PaypalCheckout {
        order_id: created.id,
        approval_url: created.approval_url,
    })
}

/// Mark a PayPal-paid cart order as paid and drop its items from the cart.
///
/// Lines added to the cart after the payment started are kept.
/// Returns `false` without changing anything if there is no matching unpaid
/// order (already confirmed, unknown, or a different amount).
pub async fn confirm_cart_order(
    pool: &PgPool,
    paypal_order_id: &str,
    user_id: &str,
    amount: Decimal,
) -> ServiceResult<bool> {
    let mut tx = pool.begin().await?;

    if !orders::mark_paid(&mut *tx, paypal_order_id, user_id, amount, now_millis()).await? {
        return Ok(false);
    }
    let removed = carts::remove_ordered(&mut *tx, user_id, paypal_order_id).await?;

    tx.commit().await?;
    tracing::info!(
        user_id,
        order_number = paypal_order_id,
        %amount,
        removed_lines = removed,
        "PayPal cart order paid"
    );
    Ok(true)
}

/// Credit a captured top-up. Returns the new balance, `None` if this PayPal
/// order was already credited.
pub async fn credit_top_up(
    pool: &PgPool,
    paypal_order_id: &str,
    user_id: &str,
    amount: Decimal,
) -> ServiceResult<Option<Decimal>> {
    let mut tx = pool.begin().await?;

    if !topups::try_record(&mut *tx, paypal_order_id, user_id, amount, now_millis()).await? {
        return Ok(None);
    }
    let balance = users::credit(&mut *tx, user_id, amount)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    tx.commit().await?;
    tracing::info!(user_id, paypal_order_id, %amount, %balance, "Balance topped up");
    Ok(Some(balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, webhook_events};
    use shared::models::ItemType;

    #[test]
    fn test_insufficient_balance_error_carries_amounts() {
        let err = insufficient_balance(Decimal::new(1000, 2), Decimal::new(4018, 2));
        assert_eq!(err.code, ErrorCode::InsufficientBalance);
        assert_eq!(err.http_status(), http::StatusCode::PAYMENT_REQUIRED);
        let details = err.details.unwrap();
        assert_eq!(details["balance"], "10.00");
        assert_eq!(details["total"], "40.18");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_pay_by_balance_debits_and_empties_cart(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "9.99").await;
        fixtures::user(&pool, "buyer", "50.00").await;
        fixtures::cart_track(&pool, "buyer", track, 2, "9.99").await;

        let checkout = pay_by_balance(&pool, "buyer").await.unwrap();
        assert_eq!(checkout.total, fixtures::dec("19.98"));
        assert_eq!(checkout.balance, fixtures::dec("30.02"));

        assert!(carts::lines(&pool, "buyer").await.unwrap().is_empty());
        let placed = orders::list(&pool, "buyer").await.unwrap();
        assert_eq!(placed.len(), 1);
        assert!(placed[0].is_paid);
        assert_eq!(placed[0].payment_method, PaymentMethod::Balance);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insufficient_balance_changes_nothing(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "9.99").await;
        fixtures::user(&pool, "buyer", "5.00").await;
        fixtures::cart_track(&pool, "buyer", track, 1, "9.99").await;

        let err = pay_by_balance(&pool, "buyer").await.unwrap_err();
        assert_eq!(fixtures::code(err), ErrorCode::InsufficientBalance);

        assert_eq!(
            users::balance(&pool, "buyer").await.unwrap(),
            Some(fixtures::dec("5.00"))
        );
        assert_eq!(carts::lines(&pool, "buyer").await.unwrap().len(), 1);
        assert!(orders::list(&pool, "buyer").await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_empty_cart_cannot_be_paid(pool: PgPool) {
        fixtures::user(&pool, "buyer", "50.00").await;
        let err = pay_by_balance(&pool, "buyer").await.unwrap_err();
        assert_eq!(fixtures::code(err), ErrorCode::CartEmpty);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_top_up_is_credited_once_per_paypal_order(pool: PgPool) {
        fixtures::user(&pool, "buyer", "10.00").await;
        let amount = fixtures::dec("25.00");

        let first = credit_top_up(&pool, "PAYPAL-TOPUP-1", "buyer", amount).await.unwrap();
        assert_eq!(first, Some(fixtures::dec("35.00")));
        let again = credit_top_up(&pool, "PAYPAL-TOPUP-1", "buyer", amount).await.unwrap();
        assert_eq!(again, None);

        assert_eq!(
            users::balance(&pool, "buyer").await.unwrap(),
            Some(fixtures::dec("35.00"))
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_redelivered_event_changes_state_once(pool: PgPool) {
        fixtures::user(&pool, "buyer", "0").await;
        let amount = fixtures::dec("15.00");

        let mut credited = 0;
        for _ in 0..2 {
            if webhook_events::try_record(&pool, "WH-1", "CHECKOUT.ORDER.APPROVED", 0)
                .await
                .unwrap()
                && credit_top_up(&pool, "PAYPAL-TOPUP-2", "buyer", amount)
                    .await
                    .unwrap()
                    .is_some()
            {
                credited += 1;
            }
        }
        assert_eq!(credited, 1);

        // A different event for the same PayPal order is still a no-op
        assert!(
            webhook_events::try_record(&pool, "WH-2", "CHECKOUT.ORDER.APPROVED", 0)
                .await
                .unwrap()
        );
        let retry = credit_top_up(&pool, "PAYPAL-TOPUP-2", "buyer", amount).await.unwrap();
        assert_eq!(retry, None);
        assert_eq!(users::balance(&pool, "buyer").await.unwrap(), Some(amount));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_confirmed_cart_order_keeps_lines_added_later(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let ordered = fixtures::paid_track(&pool, studio_id, "ordered", "4.00").await;
        let later = fixtures::paid_track(&pool, studio_id, "later", "6.00").await;
        fixtures::user(&pool, "buyer", "0").await;
        fixtures::cart_track(&pool, "buyer", ordered, 1, "4.00").await;

        let lines = carts::lines(&pool, "buyer").await.unwrap();
        let total = cart_total(&lines);
        let mut conn = pool.acquire().await.unwrap();
        orders::insert(
            &mut conn,
            NewOrder {
                id: snowflake_id(),
                user_id: "buyer",
                order_number: "PAYPAL-CART-1",
                total,
                payment_method: PaymentMethod::Paypal,
                paid_at: None,
                now: 0,
            },
            &lines,
        )
        .await
        .unwrap();
        drop(conn);

        fixtures::cart_track(&pool, "buyer", later, 1, "6.00").await;

        assert!(confirm_cart_order(&pool, "PAYPAL-CART-1", "buyer", total).await.unwrap());
        let remaining = carts::lines(&pool, "buyer").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item_id, later);

        // Already paid
        assert!(!confirm_cart_order(&pool, "PAYPAL-CART-1", "buyer", total).await.unwrap());
        assert!(orders::has_purchased(&pool, "buyer", ItemType::Track, ordered).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cart_order_with_other_amount_is_not_confirmed(pool: PgPool) {
        let studio_id = fixtures::studio(&pool, "owner").await;
        let track = fixtures::paid_track(&pool, studio_id, "hit", "4.00").await;
        fixtures::user(&pool, "buyer", "0").await;
        fixtures::cart_track(&pool, "buyer", track, 1, "4.00").await;

        let lines = carts::lines(&pool, "buyer").await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        orders::insert(
            &mut conn,
            NewOrder {
                id: snowflake_id(),
                user_id: "buyer",
                order_number: "PAYPAL-CART-2",
                total: cart_total(&lines),
                payment_method: PaymentMethod::Paypal,
                paid_at: None,
                now: 0,
            },
            &lines,
        )
        .await
        .unwrap();
        drop(conn);

        let confirmed = confirm_cart_order(&pool, "PAYPAL-CART-2", "buyer", fixtures::dec("1.00"))
            .await
            .unwrap();
        assert!(!confirmed);
        assert_eq!(carts::lines(&pool, "buyer").await.unwrap().len(), 1);
    }
}
