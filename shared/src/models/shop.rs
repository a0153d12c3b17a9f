//! Paid catalog (shop)
//!
//! Public views never carry `blob_url`; media of paid items is only handed
//! out through the download endpoints after purchase.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaidTrack {
    pub id: i64,
    pub name: String,
    pub img: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub studio_id: Option<i64>,
    pub studio_name: Option<String>,
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaidAlbum {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub img: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub studio_id: Option<i64>,
    pub studio_name: Option<String>,
    pub is_visible: bool,
}

/// Track of a paid album (listing only, no media)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaidAlbumTrack {
    pub id: i64,
    pub paid_album_id: i64,
    pub name: String,
    pub img: String,
    pub artist_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidAlbumDetail {
    #[serde(flatten)]
    pub album: PaidAlbum,
    pub tracks: Vec<PaidAlbumTrack>,
}

/// Publish paid single payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidTrackCreate {
    pub name: String,
    #[serde(default)]
    pub img: String,
    pub blob_url: String,
    pub price: Decimal,
    pub artist_id: Option<i64>,
}

/// Publish paid album payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidAlbumCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
    pub price: Decimal,
    pub artist_id: Option<i64>,
    pub tracks: Vec<super::catalog::AlbumTrackInput>,
}

/// Outcome of deleting a paid item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaidItemRemoval {
    /// Row deleted, nobody had bought it
    Deleted,
    /// Someone bought it, so it was only hidden from the shop
    Hidden,
}
