//! User JWT authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::Role;

use crate::state::AppState;

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Roles at the time the token was issued (informational for clients)
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: String,
}

const JWT_EXPIRY_DAYS: i64 = 30;

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    email: &str,
    name: &str,
    roles: &[Role],
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        roles: roles.to_vec(),
        exp: (now + chrono::Duration::days(JWT_EXPIRY_DAYS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a token
pub fn decode_token(token: &str, secret: &str) -> Result<UserClaims, AppError> {
    jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// Middleware that extracts and verifies the user JWT from the Authorization header
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format").into_response())?;

    let claims = decode_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;

    request.extensions_mut().insert(UserIdentity {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_token_round_trip_keeps_identity_and_roles() {
        let token = create_token(
            "u-1",
            "jan@example.com",
            "Jan",
            &[Role::User, Role::Artist],
            SECRET,
        )
        .unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "jan@example.com");
        assert_eq!(claims.roles, vec![Role::User, Role::Artist]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("u-1", "a@b.c", "A", &[Role::User], SECRET).unwrap();
        let err = decode_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let past = (chrono::Utc::now() - chrono::Duration::days(2)).timestamp() as usize;
        let claims = UserClaims {
            sub: "u-1".into(),
            email: "a@b.c".into(),
            name: "A".into(),
            roles: vec![],
            exp: past,
            iat: past - 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn test_garbage_token() {
        assert_eq!(
            decode_token("not.a.jwt", SECRET).unwrap_err().code,
            ErrorCode::TokenInvalid
        );
    }
}
