//! API routes for groove-server

pub mod account;
pub mod admin;
pub mod artist;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod library;
pub mod likes;
pub mod paypal_webhook;
pub mod shop;
pub mod studio;

use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use http::HeaderName;
use shared::error::{AppError, ErrorCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::user_auth::user_auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!("Database error: {e}");
    AppError::new(ErrorCode::InternalError)
}

/// Run `validator` rules, reporting failures per field
fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|errors| {
        let mut err = AppError::validation("Request validation failed");
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            err = err.with_detail(field.to_string(), messages);
        }
        err
    })
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Login and registration (rate limited per IP)
    let login = Router::new()
        .route("/api/account/login", post(account::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));
    let registration = Router::new()
        .route("/api/account/register", post(account::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    // Public catalog and shop
    let public = Router::new()
        .route("/api/app", get(admin::app_info))
        .route("/api/tracks", get(catalog::list_tracks))
        .route("/api/tracks/{id}", get(catalog::get_track))
        .route("/api/albums", get(catalog::list_albums))
        .route("/api/albums/{id}", get(catalog::get_album))
        .route("/api/artists", get(catalog::list_artists))
        .route("/api/artists/{id}", get(catalog::get_artist))
        .route("/api/artists/{id}/tracks", get(catalog::artist_tracks))
        .route("/api/artists/{id}/albums", get(catalog::artist_albums))
        .route("/api/studios", get(catalog::list_studios))
        .route("/api/studios/{id}", get(catalog::get_studio))
        .route("/api/studios/{id}/tracks", get(catalog::studio_tracks))
        .route("/api/studios/{id}/albums", get(catalog::studio_albums))
        .route("/api/shop/tracks", get(shop::list_tracks))
        .route("/api/shop/tracks/{id}", get(shop::get_track))
        .route("/api/shop/albums", get(shop::list_albums))
        .route("/api/shop/albums/{id}", get(shop::get_album))
        .route("/api/shop/studios/{id}/tracks", get(shop::studio_tracks))
        .route("/api/shop/studios/{id}/albums", get(shop::studio_albums))
        .route("/api/shop/artists/{id}/tracks", get(shop::artist_tracks))
        .route("/api/shop/artists/{id}/albums", get(shop::artist_albums));

    // PayPal webhook (signature verified through PayPal, raw body)
    let webhook = Router::new().route("/paypal/webhook", post(paypal_webhook::handle_webhook));

    // Everything below requires a valid user JWT
    let authenticated = Router::new()
        // Account
        .route("/api/account/me", get(account::me))
        .route("/api/account/token", post(account::refresh_token))
        .route("/api/account/password", put(account::change_password))
        .route(
            "/api/account/information",
            get(account::get_information).put(account::save_information),
        )
        // Likes
        .route("/api/likes/tracks", get(likes::liked_tracks))
        .route(
            "/api/likes/tracks/{id}",
            post(likes::like_track).delete(likes::unlike_track),
        )
        .route("/api/likes/albums", get(likes::liked_albums))
        .route(
            "/api/likes/albums/{id}",
            post(likes::like_album).delete(likes::unlike_album),
        )
        // Cart
        .route("/api/cart", get(cart::view).delete(cart::clear))
        .route("/api/cart/price", get(cart::price))
        .route("/api/cart/tracks", post(cart::add_track))
        .route("/api/cart/tracks/{id}", delete(cart::remove_track))
        .route("/api/cart/tracks/{id}/increase", post(cart::increase_track))
        .route("/api/cart/tracks/{id}/decrease", post(cart::decrease_track))
        .route("/api/cart/albums", post(cart::add_album))
        .route("/api/cart/albums/{id}", delete(cart::remove_album))
        .route("/api/cart/albums/{id}/increase", post(cart::increase_album))
        .route("/api/cart/albums/{id}/decrease", post(cart::decrease_album))
        // Checkout and balance
        .route("/api/checkout/balance", post(checkout::pay_by_balance))
        .route("/api/checkout/paypal", post(checkout::pay_by_paypal))
        .route("/api/balance", get(library::balance))
        .route("/api/balance/paypal", post(checkout::top_up_by_paypal))
        // Orders and purchased content
        .route("/api/orders", get(library::list_orders))
        .route("/api/orders/{id}", get(library::get_order))
        .route("/api/orders/{id}/downloads", get(library::order_downloads))
        .route("/api/library/tracks", get(library::purchased_tracks))
        .route("/api/library/albums", get(library::purchased_albums))
        .route("/api/library/tracks/{id}/owned", get(library::owns_track))
        .route("/api/library/albums/{id}/owned", get(library::owns_album))
        .route("/api/library/tracks/{id}/download", get(library::download_track))
        .route("/api/library/albums/{id}/download", get(library::download_album))
        // Artist
        .route(
            "/api/artist",
            get(artist::me)
                .post(artist::register)
                .put(artist::update)
                .delete(artist::delete),
        )
        .route("/api/artist/tracks", post(artist::create_track))
        .route("/api/artist/tracks/{id}", delete(artist::delete_track))
        .route("/api/artist/albums", post(artist::create_album))
        .route("/api/artist/albums/{id}", delete(artist::delete_album))
        .route(
            "/api/artist/albums/{album_id}/tracks/{track_id}",
            put(artist::attach_track).delete(artist::detach_track),
        )
        .route("/api/artist/studio-requests", post(artist::apply_for_studio))
        .route("/api/artist/studio", delete(artist::leave_studio))
        // Studio
        .route(
            "/api/studio",
            get(studio::mine)
                .post(studio::create)
                .put(studio::update)
                .delete(studio::delete),
        )
        .route("/api/studio/requests", get(studio::list_requests))
        .route("/api/studio/requests/{id}/accept", post(studio::accept_request))
        .route("/api/studio/requests/{id}/decline", post(studio::decline_request))
        .route("/api/studio/artists/{id}", delete(studio::remove_artist))
        .route(
            "/api/studio/admins",
            get(studio::list_admins).post(studio::add_admin),
        )
        .route("/api/studio/admins/{user_id}", delete(studio::remove_admin))
        .route("/api/studio/transfer", post(studio::transfer_ownership))
        .route("/api/studio/tracks", post(studio::create_track))
        .route("/api/studio/tracks/{id}", delete(studio::delete_track))
        .route("/api/studio/albums", post(studio::create_album))
        .route("/api/studio/albums/{id}", delete(studio::delete_album))
        .route(
            "/api/studio/shop/tracks",
            get(studio::paid_tracks).post(studio::publish_paid_track),
        )
        .route("/api/studio/shop/tracks/{id}", delete(studio::delete_paid_track))
        .route(
            "/api/studio/shop/albums",
            get(studio::paid_albums).post(studio::publish_paid_album),
        )
        .route("/api/studio/shop/albums/{id}", delete(studio::delete_paid_album))
        // Admin
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/audit", get(admin::audit_log))
        .route("/api/admin/app", put(admin::update_app))
        .route("/api/admin/app/open", post(admin::open_app))
        .route("/api/admin/app/close", post(admin::close_app))
        .route("/api/admin/transfer", post(admin::transfer_head_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(login)
        .merge(registration)
        .merge(public)
        .merge(webhook)
        .merge(authenticated)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::Config;

    fn test_router() -> Router {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        create_router(AppState::from_parts(pool, &config).unwrap())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "groove-server");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = test_router()
            .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());
    }

    #[tokio::test]
    async fn test_protected_route_rejects_bad_token() {
        let response = test_router()
            .oneshot(
                Request::post("/api/checkout/balance")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], ErrorCode::TokenInvalid.code());
    }

    #[tokio::test]
    async fn test_unsigned_webhook_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/paypal/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"id":"WH-1","event_type":"CHECKOUT.ORDER.APPROVED","resource":{}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_database() {
        let response = test_router()
            .oneshot(
                Request::post("/api/account/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Jan","email":"not-an-email","password":"abcdefg1","confirm_password":"abcdefg1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
        assert!(body["details"]["email"].is_array());
    }
}
