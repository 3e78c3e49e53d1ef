use serde::{Deserialize, Serialize};

/// XP awarded per hour of work on a quest.
const XP_PER_HOUR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Cycle used by the quest form's difficulty picker.
    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Link from a quest to the goal it contributes to. Only the id matters to
/// the client; the server may send the whole goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRef {
    pub id: i64,
}

/// A quest as held by the server. The client never flips `completed`
/// itself; only a successful finish round-trip does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub earned_xp: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub goal: Option<GoalRef>,
}

impl Quest {
    /// XP the server will award for `hours` of work: ten per hour, rounded
    /// down, with a minimum of one for any positive duration.
    pub fn projected_xp(hours: f64) -> i64 {
        let xp = (hours * XP_PER_HOUR).floor() as i64;
        if xp == 0 && hours > 0.0 {
            1
        } else {
            xp
        }
    }
}

/// Body for creating a quest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuest {
    pub title: String,
    pub earned_xp: i64,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quest_with_embedded_goal() {
        let json = r#"{
            "id": 7,
            "title": "Refactor Database Logic",
            "difficulty": "Medium",
            "earnedXp": 0,
            "completed": false,
            "goal": {"id": 3, "title": "Master Rust", "currentValue": 4.0, "targetValue": 100.0, "unit": "hours", "color": "bg-orange-500"}
        }"#;
        let quest: Quest = serde_json::from_str(json).unwrap();
        assert_eq!(quest.id, 7);
        assert_eq!(quest.difficulty, Difficulty::Medium);
        assert!(!quest.completed);
        assert_eq!(quest.goal, Some(GoalRef { id: 3 }));
    }

    #[test]
    fn test_parse_quest_without_optional_fields() {
        let json = r#"{"id": 1, "title": "Fix Login Bug", "difficulty": "Easy"}"#;
        let quest: Quest = serde_json::from_str(json).unwrap();
        assert_eq!(quest.earned_xp, 0);
        assert!(!quest.completed);
        assert!(quest.goal.is_none());
    }

    #[test]
    fn test_new_quest_wire_format() {
        let body = NewQuest {
            title: "Design UI".to_string(),
            earned_xp: 0,
            difficulty: Difficulty::Hard,
            goal: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Design UI", "earnedXp": 0, "difficulty": "Hard"})
        );
    }

    #[test]
    fn test_projected_xp() {
        assert_eq!(Quest::projected_xp(0.0), 0);
        assert_eq!(Quest::projected_xp(0.01), 1);
        assert_eq!(Quest::projected_xp(1.0), 10);
        assert_eq!(Quest::projected_xp(2.55), 25);
    }

    #[test]
    fn test_difficulty_cycle() {
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
        assert_eq!(Difficulty::Medium.next(), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }
}
