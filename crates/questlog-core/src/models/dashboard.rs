use serde::{Deserialize, Serialize};

/// XP needed per level; the server carries the remainder into the next one.
pub const XP_PER_LEVEL: i64 = 100;

const ADMIN_ROLE: &str = "ADMIN";

/// Trainer profile and companion progress, as returned by `GET /dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub trainer_name: String,
    #[serde(default)]
    pub pokemon_name: String,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub current_xp: i64,
    #[serde(default)]
    pub total_xp: i64,
    #[serde(default)]
    pub evolution_stage: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl Dashboard {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Fraction of the way to the next level.
    pub fn level_progress(&self) -> f64 {
        (self.current_xp as f64 / XP_PER_LEVEL as f64).clamp(0.0, 1.0)
    }
}

/// Body for `PUT /dashboard/profile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub profile_picture_url: String,
}

/// Response of `PUT /dashboard/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
