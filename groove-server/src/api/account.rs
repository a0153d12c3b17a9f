//! Account API: registration, login, profile, password, postal details

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{AuthToken, Role, UserInformation, UserProfile};
use shared::money::STARTING_BALANCE;
use shared::util::now_millis;
use validator::Validate;

use super::{ApiResult, internal, validate};
use crate::auth::UserIdentity;
use crate::auth::user_auth::create_token;
use crate::db::{self, artists, studios, users};
use crate::state::AppState;
use crate::util::{check_new_password, hash_password, normalize_email, verify_password};

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn issue_token(
    state: &AppState,
    user: &users::User,
    roles: Vec<Role>,
) -> Result<AuthToken, AppError> {
    let token = create_token(&user.id, &user.email, &user.name, &roles, &state.jwt_secret)
        .map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;
    Ok(AuthToken {
        token,
        user_id: user.id.clone(),
        roles,
    })
}

/// Token carrying the user's current roles
pub(crate) async fn fresh_token(state: &AppState, user_id: &str) -> ApiResult<AuthToken> {
    let user = users::find_by_id(&state.pool, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let roles = users::roles(&state.pool, user_id).await.map_err(internal)?;
    Ok(Json(issue_token(state, &user, roles)?))
}

/// POST /api/account/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthToken> {
    validate(&req)?;
    check_new_password(&req.password, &req.confirm_password)?;
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();

    let hashed_password = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hash error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = now_millis();
    let roles = users::create(
        &state.pool,
        &user_id,
        &name,
        &email,
        &hashed_password,
        STARTING_BALANCE,
        now,
    )
    .await
    .map_err(internal)?
    .ok_or_else(|| AppError::new(ErrorCode::EmailAlreadyExists))?;

    tracing::info!(user_id = %user_id, admin = roles.contains(&Role::Admin), "User registered");
    let _ = db::audit::log(&state.pool, &user_id, "register", None, None, now).await;

    let user = users::User {
        id: user_id,
        name,
        email,
        hashed_password,
        balance: STARTING_BALANCE,
        created_at: now,
    };
    Ok(Json(issue_token(&state, &user, roles)?))
}

/// POST /api/account/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthToken> {
    let user = users::find_by_email(&state.pool, &normalize_email(&req.email))
        .await
        .map_err(internal)?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::invalid_credentials());
    }

    let roles = users::roles(&state.pool, &user.id).await.map_err(internal)?;
    let _ = db::audit::log(&state.pool, &user.id, "login", None, None, now_millis()).await;

    Ok(Json(issue_token(&state, &user, roles)?))
}

/// POST /api/account/token
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<AuthToken> {
    fresh_token(&state, &identity.user_id).await
}

/// GET /api/account/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<UserProfile> {
    let user = users::find_by_id(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let roles = users::roles(&state.pool, &user.id).await.map_err(internal)?;
    let artist = artists::find_by_user(&state.pool, &user.id)
        .await
        .map_err(internal)?;
    let studio_id = studios::managed_by(&state.pool, &user.id)
        .await
        .map_err(internal)?;

    Ok(Json(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        balance: user.balance,
        roles,
        artist_id: artist.map(|a| a.id),
        studio_id,
        created_at: user.created_at,
    }))
}

/// PUT /api/account/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<serde_json::Value> {
    let user = users::find_by_id(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&req.current_password, &user.hashed_password) {
        return Err(AppError::invalid_credentials());
    }
    check_new_password(&req.new_password, &req.confirm_password)?;

    let hashed = hash_password(&req.new_password).map_err(|e| {
        tracing::error!("Password hash error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    users::update_password(&state.pool, &user.id, &hashed)
        .await
        .map_err(internal)?;

    tracing::info!(user_id = %user.id, email = %identity.email, "Password changed");
    let _ = db::audit::log(&state.pool, &user.id, "change_password", None, None, now_millis()).await;
    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}

/// GET /api/account/information
pub async fn get_information(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<UserInformation> {
    let info = db::user_info::find(&state.pool, &identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserInformationNotFound))?;
    Ok(Json(info))
}

/// PUT /api/account/information
pub async fn save_information(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(info): Json<UserInformation>,
) -> ApiResult<UserInformation> {
    db::user_info::upsert(&state.pool, &identity.user_id, &info)
        .await
        .map_err(internal)?;
    Ok(Json(info))
}
