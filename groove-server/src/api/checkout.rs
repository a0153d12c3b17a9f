//! Checkout: pay the cart with balance or PayPal, top up with PayPal

use axum::{Extension, Json, extract::State};
use shared::models::{BalanceCheckout, PaypalCheckout, TopUp};
use shared::util::now_millis;

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db;
use crate::services::checkout;
use crate::state::AppState;

/// POST /api/checkout/balance
pub async fn pay_by_balance(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<BalanceCheckout> {
    let result = checkout::pay_by_balance(&state.pool, &identity.user_id).await?;

    let detail = serde_json::json!({
        "order_number": result.order_number,
        "total": result.total.to_string(),
    });
    let _ = db::audit::log(
        &state.pool,
        &identity.user_id,
        "checkout_balance",
        Some(&detail),
        None,
        now_millis(),
    )
    .await;

    Ok(Json(result))
}

/// POST /api/checkout/paypal
pub async fn pay_by_paypal(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<PaypalCheckout> {
    Ok(Json(
        checkout::start_paypal_cart_payment(&state.pool, &state.paypal, &identity.user_id).await?,
    ))
}

/// POST /api/balance/paypal
pub async fn top_up_by_paypal(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<TopUp>,
) -> ApiResult<PaypalCheckout> {
    Ok(Json(
        checkout::start_paypal_top_up(&state.paypal, &identity.user_id, req.amount).await?,
    ))
}
