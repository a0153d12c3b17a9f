//! Free catalog: tracks, albums, artists, studios

use serde::{Deserialize, Serialize};

/// Free track with display names of its owners
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub img: String,
    pub blob_url: String,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub album_id: Option<i64>,
    pub album_name: Option<String>,
    pub studio_id: Option<i64>,
    pub studio_name: Option<String>,
}

/// Free album
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub img: String,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub studio_id: Option<i64>,
    pub studio_name: Option<String>,
}

/// Album with its tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Artist {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub img: String,
    pub studio_id: Option<i64>,
    pub studio_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Studio {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub localization: String,
    pub img: String,
    pub address_url: String,
    pub created_at: i64,
}

/// Studio with the artists signed to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioDetail {
    #[serde(flatten)]
    pub studio: Studio,
    pub artists: Vec<Artist>,
}

/// Create free track payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCreate {
    pub name: String,
    #[serde(default)]
    pub img: String,
    pub blob_url: String,
    pub album_id: Option<i64>,
    /// Only honoured for studio uploads
    pub artist_id: Option<i64>,
}

/// Create free album payload, optionally with its tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
    /// Only honoured for studio uploads
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub tracks: Vec<AlbumTrackInput>,
}

/// Track uploaded together with an album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumTrackInput {
    pub name: String,
    #[serde(default)]
    pub img: String,
    pub blob_url: String,
}

/// Artist profile payload (create and update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
}

/// Studio payload (create and update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioProfile {
    pub name: String,
    #[serde(default)]
    pub localization: String,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub address_url: String,
}

/// Pending request of an artist to join a studio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ArtistRequest {
    pub id: i64,
    pub studio_id: i64,
    pub artist_id: i64,
    pub artist_name: String,
    pub created_at: i64,
}

/// Studio admin entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StudioAdmin {
    pub user_id: String,
    pub name: String,
    pub email: String,
}
