//! Data models for questlog entities.
//!
//! All types mirror the server's JSON (camelCase on the wire):
//!
//! - `Quest`, `NewQuest`, `Difficulty`: tasks on the quest board
//! - `Goal`, `NewGoal`: long-running targets quests can feed
//! - `Achievements`, `Badge`: the trophy case
//! - `Dashboard`: the trainer profile, level and XP
//! - `AdminUser`, `WorkSession`: admin listing and logged work

pub mod achievement;
pub mod admin;
pub mod dashboard;
pub mod goal;
pub mod quest;
pub mod work;

pub use achievement::{Achievements, Badge};
pub use admin::AdminUser;
pub use dashboard::{Dashboard, ProfileUpdate, StatusResponse};
pub use goal::{Goal, NewGoal};
pub use quest::{Difficulty, GoalRef, NewQuest, Quest};
pub use work::{WorkRequest, WorkSession};
