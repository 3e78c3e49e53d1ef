use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievements {
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub unlocked_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub desc: String,
    #[serde(default)]
    pub icon: String,
    pub unlocked: bool,
    #[serde(default)]
    pub current_progress: f64,
    #[serde(default)]
    pub target_progress: f64,
}

impl Badge {
    /// Progress toward unlocking, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.unlocked {
            return 1.0;
        }
        if self.target_progress <= 0.0 {
            return 0.0;
        }
        (self.current_progress / self.target_progress).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_achievements() {
        let json = r#"{
            "badges": [
                {"id": 1, "name": "First Steps", "desc": "Log your first work session", "icon": "👟", "unlocked": true, "currentProgress": 1, "targetProgress": 1},
                {"id": 4, "name": "Marathon Runner", "desc": "Work 8 hours in one day", "icon": "🏃", "unlocked": false, "currentProgress": 2.0, "targetProgress": 8.0}
            ],
            "unlockedCount": 1
        }"#;
        let achievements: Achievements = serde_json::from_str(json).unwrap();
        assert_eq!(achievements.unlocked_count, 1);
        assert_eq!(achievements.badges.len(), 2);
        assert_eq!(achievements.badges[0].progress(), 1.0);
        assert_eq!(achievements.badges[1].progress(), 0.25);
    }
}
