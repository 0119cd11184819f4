//! Homepage banner model.

use serde::{Deserialize, Serialize};

use stitchpress_core::BannerId;

/// A promotional banner managed from the admin console.
///
/// The public endpoint only ever returns active banners, ordered by
/// `position` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub image_url: String,
    pub link: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

/// Fields for creating or fully replacing a banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBanner {
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}
