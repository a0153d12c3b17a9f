//! Role and ownership checks
//!
//! Roles in the JWT are informational; every check here reads the database.

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::models::{Artist, Role, Studio};

use crate::db::catalog::ItemOwner;
use crate::db::{artists, studios, users};
use crate::error::ServiceResult;

/// The caller's artist profile
pub async fn require_artist(pool: &PgPool, user_id: &str) -> ServiceResult<Artist> {
    artists::find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotAnArtist).into())
}

pub async fn require_admin(pool: &PgPool, user_id: &str) -> ServiceResult<()> {
    if users::has_role(pool, user_id, Role::Admin).await? {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::AdminRequired).into())
    }
}

/// Studio the caller owns or administers
pub async fn require_studio_manager(pool: &PgPool, user_id: &str) -> ServiceResult<Studio> {
    let studio_id = studios::managed_by(pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotStudioManager))?;
    studios::find(pool, studio_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StudioNotFound).into())
}

/// Studio the caller owns
pub async fn require_studio_owner(pool: &PgPool, user_id: &str) -> ServiceResult<Studio> {
    studios::find_by_owner(pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotStudioOwner).into())
}

/// Whether an artist may change a free item
pub fn artist_owns(owner: ItemOwner, artist_id: i64) -> bool {
    owner.artist_id == Some(artist_id)
}

/// Whether a studio may change a free item
pub fn studio_owns(owner: ItemOwner, studio_id: i64) -> bool {
    owner.studio_id == Some(studio_id)
}

/// An artist named on a studio upload must be signed to that studio
pub async fn check_studio_artist(
    pool: &PgPool,
    studio_id: i64,
    artist_id: Option<i64>,
) -> ServiceResult<()> {
    let Some(artist_id) = artist_id else {
        return Ok(());
    };
    let artist = artists::find(pool, artist_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ArtistNotFound))?;
    if artist.studio_id != Some(studio_id) {
        return Err(AppError::new(ErrorCode::ArtistNotInStudio).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ownership() {
        let by_artist = ItemOwner {
            artist_id: Some(7),
            studio_id: None,
        };
        assert!(artist_owns(by_artist, 7));
        assert!(!artist_owns(by_artist, 8));
        assert!(!studio_owns(by_artist, 7));

        let orphan = ItemOwner {
            artist_id: None,
            studio_id: None,
        };
        assert!(!artist_owns(orphan, 7));
        assert!(!studio_owns(orphan, 7));

        let by_studio = ItemOwner {
            artist_id: Some(7),
            studio_id: Some(3),
        };
        assert!(studio_owns(by_studio, 3));
    }
}
