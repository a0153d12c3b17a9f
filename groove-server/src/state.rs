//! Application state for groove-server

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::paypal::PayPalClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// PayPal REST client
    pub paypal: PayPalClient,
    /// Accept unsigned webhooks (development only)
    pub skip_webhook_verification: bool,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Self::from_parts(pool, config)
    }

    /// Build the state around an existing pool
    pub fn from_parts(pool: PgPool, config: &Config) -> Result<Self, BoxError> {
        if config.paypal_skip_webhook_verification {
            tracing::warn!("PayPal webhook signature verification is DISABLED");
        }
        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            paypal: PayPalClient::new(config)?,
            skip_webhook_verification: config.paypal_skip_webhook_verification,
            rate_limiter: RateLimiter::new(config.trust_forwarded_for),
        })
    }
}
