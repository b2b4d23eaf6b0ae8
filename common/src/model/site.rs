use serde::{Deserialize, Serialize};

/// Keys the settings editor reads and writes. The table accepts any key,
/// but only these are ever written by the back office.
pub const SITE_SETTING_KEYS: [&str; 10] = [
    "site_name",
    "tagline",
    "phone",
    "email",
    "address",
    "about_text",
    "google_maps_embed",
    "social_facebook",
    "social_instagram",
    "social_youtube",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSetting {
    pub id: i64,
    pub key: String,
    pub value: Option<String>,
}
