use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub current_value: f64,
    pub target_value: f64,
    /// e.g. "hours", "XP", "percent"
    pub unit: String,
    #[serde(default)]
    pub color: String,
}

impl Goal {
    /// Fraction complete, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.target_value > 0.0 && self.current_value >= self.target_value
    }
}

/// Body for creating or updating a goal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub current_value: f64,
    pub target_value: f64,
    pub unit: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: f64, target: f64) -> Goal {
        Goal {
            id: 1,
            title: "Complete 50 Work Hours".to_string(),
            current_value: current,
            target_value: target,
            unit: "hours".to_string(),
            color: "bg-blue-500".to_string(),
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(goal(0.0, 50.0).progress(), 0.0);
        assert_eq!(goal(25.0, 50.0).progress(), 0.5);
        assert_eq!(goal(80.0, 50.0).progress(), 1.0);
        assert_eq!(goal(10.0, 0.0).progress(), 0.0);
    }

    #[test]
    fn test_is_complete() {
        assert!(!goal(42.0, 50.0).is_complete());
        assert!(goal(50.0, 50.0).is_complete());
        assert!(!goal(0.0, 0.0).is_complete());
    }

    #[test]
    fn test_parse_goal() {
        let json = r#"{"id": 2, "title": "Evolve", "currentValue": 800, "targetValue": 1000, "unit": "XP", "color": "bg-purple-500"}"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.unit, "XP");
        assert!((goal.progress() - 0.8).abs() < f64::EPSILON);
    }
}
