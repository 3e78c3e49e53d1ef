use serde::{Deserialize, Serialize};

/// A row of the admin user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub level: i64,
}
