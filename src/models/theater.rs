use serde::{Deserialize, Serialize};

use super::MediaSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theater {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<String>,
    pub video_player_access: Option<String>,
    pub media_source: Option<MediaSource>,
}

/// Partial update for `PUT /user/@theater`; only set fields are sent.
#[derive(Debug, Clone, Default)]
pub struct TheaterUpdate {
    pub description: Option<String>,
    pub privacy: Option<String>,
    pub video_player_access: Option<String>,
}

impl TheaterUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.privacy.is_none() && self.video_player_access.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtitle {
    pub id: Option<i64>,
    pub lang: Option<String>,
    pub url: Option<String>,
}
