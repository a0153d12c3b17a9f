//! Site administration

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{AppInfo, AppInfoUpdate, AuthToken, UserSummary};
use shared::util::now_millis;

use super::account::fresh_token;
use super::{ApiResult, internal};
use crate::auth::UserIdentity;
use crate::db::{self, app_settings, audit::AuditEntry, users};
use crate::services::permissions::require_admin;
use crate::state::AppState;

const DEFAULT_AUDIT_LIMIT: i64 = 50;
const MAX_AUDIT_LIMIT: i64 = 500;

#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditQuery {
    fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub user_id: String,
}

/// GET /api/app
pub async fn app_info(State(state): State<AppState>) -> ApiResult<AppInfo> {
    let info = app_settings::get(&state.pool).await.map_err(internal)?;
    Ok(Json(info))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<UserSummary>> {
    require_admin(&state.pool, &identity.user_id).await?;
    let users = users::list_summaries(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(users))
}

/// GET /api/admin/audit?limit=&offset=
pub async fn audit_log(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditEntry>> {
    require_admin(&state.pool, &identity.user_id).await?;
    let (limit, offset) = query.page();
    let entries = db::audit::query(&state.pool, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(entries))
}

/// PUT /api/admin/app
pub async fn update_app(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<AppInfoUpdate>,
) -> ApiResult<AppInfo> {
    require_admin(&state.pool, &identity.user_id).await?;
    if req.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "name must not be empty",
        ));
    }
    let info = app_settings::update(&state.pool, &req)
        .await
        .map_err(internal)?;
    Ok(Json(info))
}

async fn set_closed(state: &AppState, user_id: &str, is_closed: bool) -> ApiResult<AppInfo> {
    require_admin(&state.pool, user_id).await?;
    let info = app_settings::set_closed(&state.pool, is_closed)
        .await
        .map_err(internal)?;

    let action = if is_closed { "app_closed" } else { "app_opened" };
    let _ = db::audit::log(&state.pool, user_id, action, None, None, now_millis()).await;
    tracing::info!(user_id, is_closed, "App availability changed");

    Ok(Json(info))
}

/// POST /api/admin/app/open
pub async fn open_app(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<AppInfo> {
    set_closed(&state, &identity.user_id, false).await
}

/// POST /api/admin/app/close
pub async fn close_app(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<AppInfo> {
    set_closed(&state, &identity.user_id, true).await
}

/// POST /api/admin/transfer
///
/// The target becomes admin and the caller steps down. Returns the caller's
/// new token.
pub async fn transfer_head_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<AuthToken> {
    require_admin(&state.pool, &identity.user_id).await?;
    if req.user_id == identity.user_id {
        return Err(AppError::invalid_request("cannot transfer admin to yourself"));
    }
    users::find_by_id(&state.pool, &req.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    users::transfer_admin(&state.pool, &identity.user_id, &req.user_id)
        .await
        .map_err(internal)?;

    let detail = serde_json::json!({ "new_admin": req.user_id });
    let _ = db::audit::log(
        &state.pool,
        &identity.user_id,
        "admin_transferred",
        Some(&detail),
        None,
        now_millis(),
    )
    .await;
    tracing::warn!(from = %identity.user_id, to = %req.user_id, "Head admin transferred");

    fresh_token(&state, &identity.user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_page_defaults_and_clamps() {
        let q = AuditQuery {
            limit: None,
            offset: None,
        };
        assert_eq!(q.page(), (DEFAULT_AUDIT_LIMIT, 0));

        let q = AuditQuery {
            limit: Some(10_000),
            offset: Some(-3),
        };
        assert_eq!(q.page(), (MAX_AUDIT_LIMIT, 0));

        let q = AuditQuery {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(q.page(), (1, 20));
    }
}
