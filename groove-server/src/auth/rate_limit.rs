//! Application-layer rate limiting for login and registration routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Entries idle for longer than this are dropped by `cleanup`
const STALE_AFTER_SECS: u64 = 300;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
    /// Key on X-Forwarded-For (only behind a proxy that overwrites it)
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(trust_forwarded_for: bool) -> Self {
        Self {
            inner: Arc::default(),
            trust_forwarded_for,
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove stale entries
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(STALE_AFTER_SECS);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// Client IP: the peer address, or the first X-Forwarded-For entry when
/// the proxy is trusted.
fn extract_ip(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for
        && let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn too_many_requests() -> Response {
    AppError::new(ErrorCode::TooManyRequests).into_response()
}

/// Rate limit middleware for login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request, state.rate_limiter.trust_forwarded_for);
    if !state.rate_limiter.check("login", &ip, 5, 60).await {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return Err(too_many_requests());
    }
    Ok(next.run(request).await)
}

/// Rate limit middleware for registration: 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request, state.rate_limiter.trust_forwarded_for);
    if !state.rate_limiter.check("register", &ip, 3, 60).await {
        tracing::warn!(ip = %ip, "Registration rate limit exceeded");
        return Err(too_many_requests());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn test_limit_per_route_and_ip() {
        let limiter = RateLimiter::new(false);
        for _ in 0..3 {
            assert!(limiter.check("register", "10.0.0.1", 3, 60).await);
        }
        assert!(!limiter.check("register", "10.0.0.1", 3, 60).await);
        // other IP and other route have their own budget
        assert!(limiter.check("register", "10.0.0.2", 3, 60).await);
        assert!(limiter.check("login", "10.0.0.1", 3, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(false);
        assert!(limiter.check("login", "ip", 1, 60).await);
        assert!(!limiter.check("login", "ip", 1, 60).await);
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("login", "ip", 1, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new(false);
        limiter.check("login", "a", 5, 60).await;
        limiter.check("register", "b", 5, 60).await;
        assert_eq!(limiter.tracked().await, 2);
        tokio::time::advance(std::time::Duration::from_secs(STALE_AFTER_SECS + 1)).await;
        limiter.check("login", "c", 5, 60).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, 1);
    }

    fn forwarded_request() -> Request {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let peer: std::net::SocketAddr = "192.0.2.10:50000".parse().unwrap();
        request
            .extensions_mut()
            .insert(axum::extract::ConnectInfo(peer));
        request
    }

    #[test]
    fn test_forwarded_for_ignored_unless_trusted() {
        assert_eq!(extract_ip(&forwarded_request(), false), "192.0.2.10");
    }

    #[test]
    fn test_forwarded_for_used_behind_trusted_proxy() {
        assert_eq!(extract_ip(&forwarded_request(), true), "203.0.113.7");

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_ip(&bare, true), "unknown");
    }

    #[tokio::test]
    async fn test_spoofed_header_does_not_reset_budget() {
        let limiter = RateLimiter::new(false);
        for spoofed in ["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4"] {
            let mut request = forwarded_request();
            request
                .headers_mut()
                .insert("x-forwarded-for", spoofed.parse().unwrap());
            let ip = extract_ip(&request, limiter.trust_forwarded_for);
            limiter.check("register", &ip, 3, 60).await;
        }
        assert!(!limiter.check("register", "192.0.2.10", 3, 60).await);
    }
}
