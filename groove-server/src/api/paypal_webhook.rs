//! PayPal webhook handler
//!
//! POST /paypal/webhook: raw body, verified through PayPal before parsing

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;
use shared::util::now_millis;

use crate::db;
use crate::paypal::{CustomId, WebhookHeaders, resource_custom_id};
use crate::services::checkout;
use crate::state::AppState;

/// Event types this endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    OrderApproved,
    CaptureCompleted,
    CaptureRefunded,
    CaptureDenied,
}

impl EventKind {
    fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "CHECKOUT.ORDER.APPROVED" => Some(EventKind::OrderApproved),
            "PAYMENT.CAPTURE.COMPLETED" => Some(EventKind::CaptureCompleted),
            "PAYMENT.CAPTURE.REFUNDED" => Some(EventKind::CaptureRefunded),
            "PAYMENT.CAPTURE.DENIED" => Some(EventKind::CaptureDenied),
            _ => None,
        }
    }
}

/// Handle an incoming PayPal webhook event
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Transmission headers
    let Some(transmission) = WebhookHeaders::from_headers(&headers) else {
        tracing::warn!("Missing PayPal transmission headers");
        return StatusCode::BAD_REQUEST;
    };

    let Ok(raw_event) = std::str::from_utf8(&body) else {
        tracing::warn!("Webhook body is not UTF-8");
        return StatusCode::BAD_REQUEST;
    };

    // 2. Verify signature
    if state.skip_webhook_verification {
        tracing::warn!(
            transmission_id = %transmission.transmission_id,
            "Webhook signature verification skipped"
        );
    } else {
        match state
            .paypal
            .verify_webhook_signature(&transmission, raw_event)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    transmission_id = %transmission.transmission_id,
                    "Webhook signature verification failed"
                );
                return StatusCode::BAD_REQUEST;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Webhook signature verification errored");
                return StatusCode::BAD_REQUEST;
            }
        }
    }

    // 3. Parse JSON event
    let event: Value = match serde_json::from_str(raw_event) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["event_type"].as_str().unwrap_or("");
    let Some(kind) = EventKind::parse(event_type) else {
        tracing::warn!(event_type, "Unsupported PayPal event type");
        return StatusCode::BAD_REQUEST;
    };

    let Some(event_id) = event["id"].as_str() else {
        tracing::warn!("Webhook event missing id");
        return StatusCode::BAD_REQUEST;
    };
    tracing::info!(event_id, event_type, "Received PayPal webhook");

    // 4. Idempotency: record first, skip if already there
    match db::webhook_events::try_record(&state.pool, event_id, event_type, now_millis()).await {
        Ok(false) => {
            tracing::info!(event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        Ok(true) => {}
    }

    // 5. Dispatch
    let status = match kind {
        EventKind::OrderApproved => handle_order_approved(&state, &event["resource"]).await,
        EventKind::CaptureCompleted | EventKind::CaptureRefunded | EventKind::CaptureDenied => {
            tracing::info!(
                event_id,
                event_type,
                resource_id = event["resource"]["id"].as_str().unwrap_or(""),
                "PayPal capture event acknowledged"
            );
            StatusCode::OK
        }
    };

    // 6. Let PayPal's retry reprocess the event after a failure
    if status.is_server_error()
        && let Err(e) = db::webhook_events::forget(&state.pool, event_id).await
    {
        tracing::error!(%e, event_id, "Failed to forget webhook event");
    }
    status
}

/// CHECKOUT.ORDER.APPROVED → capture, then credit the balance or pay the order
async fn handle_order_approved(state: &AppState, resource: &Value) -> StatusCode {
    let Some(order_id) = resource["id"].as_str() else {
        tracing::warn!("Approved order missing id");
        return StatusCode::OK;
    };

    let custom_id = match resource_custom_id(resource).map(str::parse::<CustomId>) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            tracing::warn!(order_id, error = %e, "Unparseable custom_id on approved order");
            return StatusCode::OK;
        }
        None => {
            tracing::warn!(order_id, "Approved order has no custom_id");
            return StatusCode::OK;
        }
    };

    let capture = match state.paypal.capture_order(order_id).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(order_id, error = %e, "PayPal capture failed");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    if !capture.is_completed() {
        tracing::warn!(order_id, status = %capture.status, "Capture not completed");
        return StatusCode::OK;
    }
    if let Some(captured) = capture.amount
        && captured != custom_id.amount()
    {
        tracing::warn!(
            order_id,
            %captured,
            expected = %custom_id.amount(),
            "Captured amount does not match"
        );
        return StatusCode::OK;
    }

    match &custom_id {
        CustomId::AddBalance { amount, user_id } => {
            match checkout::credit_top_up(&state.pool, order_id, user_id, *amount).await {
                Ok(Some(_)) => StatusCode::OK,
                Ok(None) => {
                    tracing::info!(order_id, "Top-up already credited");
                    StatusCode::OK
                }
                Err(e) => {
                    let e: shared::error::AppError = e.into();
                    tracing::error!(order_id, error = %e.message, "Top-up credit failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
        CustomId::CartPayment { amount, user_id } => {
            match checkout::confirm_cart_order(&state.pool, order_id, user_id, *amount).await {
                Ok(true) => StatusCode::OK,
                Ok(false) => {
                    tracing::warn!(order_id, %user_id, "No pending order matches the payment");
                    StatusCode::OK
                }
                Err(e) => {
                    let e: shared::error::AppError = e.into();
                    tracing::error!(order_id, error = %e.message, "Order confirmation failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(
            EventKind::parse("CHECKOUT.ORDER.APPROVED"),
            Some(EventKind::OrderApproved)
        );
        assert_eq!(
            EventKind::parse("PAYMENT.CAPTURE.COMPLETED"),
            Some(EventKind::CaptureCompleted)
        );
        assert_eq!(
            EventKind::parse("PAYMENT.CAPTURE.REFUNDED"),
            Some(EventKind::CaptureRefunded)
        );
        assert_eq!(
            EventKind::parse("PAYMENT.CAPTURE.DENIED"),
            Some(EventKind::CaptureDenied)
        );
    }

    #[test]
    fn test_unknown_event_kinds_rejected() {
        assert_eq!(EventKind::parse("BILLING.SUBSCRIPTION.CREATED"), None);
        assert_eq!(EventKind::parse("checkout.order.approved"), None);
        assert_eq!(EventKind::parse(""), None);
    }
}
