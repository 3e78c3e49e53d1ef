//! Modal forms for creating and editing quests, goals, profile and status.

use questlog_core::models::{
    Dashboard, Difficulty, Goal, GoalRef, NewGoal, NewQuest, ProfileUpdate, WorkRequest,
};

/// Maximum length of a free-text field.
const MAX_TEXT_LENGTH: usize = 120;

/// Maximum length of a numeric field.
const MAX_NUMBER_LENGTH: usize = 10;

const GOAL_UNITS: [&str; 3] = ["hours", "XP", "percent"];

/// Color classes the server stores for goals.
pub const GOAL_COLORS: [&str; 5] = [
    "bg-orange-500",
    "bg-blue-500",
    "bg-purple-500",
    "bg-green-500",
    "bg-red-500",
];

/// Which form is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewQuest,
    NewGoal,
    EditGoal(i64),
    Profile,
    Status,
    LogWork,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::NewQuest => "New Quest",
            FormKind::NewGoal => "New Goal",
            FormKind::EditGoal(_) => "Edit Goal",
            FormKind::Profile => "Edit Profile",
            FormKind::Status => "Set Status",
            FormKind::LogWork => "Log Work",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text,
    Decimal,
    /// Fixed options, each with an optional id (e.g. a goal link).
    Choice {
        options: Vec<(String, Option<i64>)>,
        selected: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub input: FieldInput,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            input: FieldInput::Text,
        }
    }

    fn decimal(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            input: FieldInput::Decimal,
        }
    }

    fn choice(label: &'static str, options: Vec<(String, Option<i64>)>, selected: usize) -> Self {
        let selected = selected.min(options.len().saturating_sub(1));
        let value = options
            .get(selected)
            .map(|(label, _)| label.clone())
            .unwrap_or_default();
        Self {
            label,
            value,
            input: FieldInput::Choice { options, selected },
        }
    }

    fn labels(options: &[&str]) -> Vec<(String, Option<i64>)> {
        options.iter().map(|o| (o.to_string(), None)).collect()
    }

    /// The id attached to the selected choice.
    pub fn choice_id(&self) -> Option<i64> {
        match &self.input {
            FieldInput::Choice { options, selected } => {
                options.get(*selected).and_then(|(_, id)| *id)
            }
            _ => None,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.input, FieldInput::Choice { .. })
    }

    fn accepts(&self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        match &self.input {
            FieldInput::Text => self.value.chars().count() < MAX_TEXT_LENGTH,
            FieldInput::Decimal => {
                self.value.len() < MAX_NUMBER_LENGTH
                    && (c.is_ascii_digit() || (c == '.' && !self.value.contains('.')))
            }
            FieldInput::Choice { .. } => false,
        }
    }

    fn cycle(&mut self, forward: bool) {
        if let FieldInput::Choice { options, selected } = &mut self.input {
            if options.is_empty() {
                return;
            }
            *selected = if forward {
                (*selected + 1) % options.len()
            } else {
                (*selected + options.len() - 1) % options.len()
            };
            self.value = options[*selected].0.clone();
        }
    }

    fn parse_decimal(&self) -> Result<f64, String> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{} must be a number", self.label))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn new_quest(goals: &[Goal]) -> Self {
        let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
        let mut goal_options = vec![("None".to_string(), None)];
        goal_options.extend(goals.iter().map(|g| (g.title.clone(), Some(g.id))));

        Self::new(
            FormKind::NewQuest,
            vec![
                FormField::text("Title", ""),
                FormField::choice(
                    "Difficulty",
                    FormField::labels(&difficulties.map(|d| d.label())),
                    0,
                ),
                FormField::choice("Goal", goal_options, 0),
            ],
        )
    }

    pub fn new_goal() -> Self {
        Self::new(
            FormKind::NewGoal,
            vec![
                FormField::text("Title", ""),
                FormField::decimal("Current", "0"),
                FormField::decimal("Target", ""),
                FormField::choice("Unit", FormField::labels(&GOAL_UNITS), 0),
                FormField::choice("Color", FormField::labels(&GOAL_COLORS), 0),
            ],
        )
    }

    pub fn edit_goal(goal: &Goal) -> Self {
        let unit = GOAL_UNITS.iter().position(|u| *u == goal.unit).unwrap_or(0);
        let color = GOAL_COLORS.iter().position(|c| *c == goal.color).unwrap_or(0);
        Self::new(
            FormKind::EditGoal(goal.id),
            vec![
                FormField::text("Title", goal.title.clone()),
                FormField::decimal("Current", goal.current_value.to_string()),
                FormField::decimal("Target", goal.target_value.to_string()),
                FormField::choice("Unit", FormField::labels(&GOAL_UNITS), unit),
                FormField::choice("Color", FormField::labels(&GOAL_COLORS), color),
            ],
        )
    }

    pub fn profile(dashboard: &Dashboard) -> Self {
        Self::new(
            FormKind::Profile,
            vec![
                FormField::text("Username", dashboard.trainer_name.clone()),
                FormField::text(
                    "Picture URL",
                    dashboard.profile_picture_url.clone().unwrap_or_default(),
                ),
            ],
        )
    }

    pub fn status(dashboard: &Dashboard) -> Self {
        Self::new(
            FormKind::Status,
            vec![FormField::text(
                "Status",
                dashboard.status.clone().unwrap_or_default(),
            )],
        )
    }

    pub fn log_work() -> Self {
        Self::new(FormKind::LogWork, vec![FormField::decimal("Hours", "")])
    }

    #[cfg(test)]
    fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.is_choice() && c == ' ' {
                field.cycle(true);
            } else if field.accepts(c) {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !field.is_choice() {
                field.value.pop();
            }
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cycle(forward);
        }
    }

    fn field(&self, label: &str) -> Result<&FormField, String> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .ok_or_else(|| format!("{} is missing", label))
    }

    fn required_text(&self, label: &str) -> Result<String, String> {
        let value = self.field(label)?.value.trim();
        if value.is_empty() {
            return Err(format!("{} is required", label));
        }
        Ok(value.to_string())
    }

    pub fn to_new_quest(&self) -> Result<NewQuest, String> {
        let difficulty = match self.field("Difficulty")?.value.as_str() {
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        };
        Ok(NewQuest {
            title: self.required_text("Title")?,
            earned_xp: 0,
            difficulty,
            goal: self.field("Goal")?.choice_id().map(|id| GoalRef { id }),
        })
    }

    pub fn to_new_goal(&self) -> Result<NewGoal, String> {
        let current_value = self.field("Current")?.parse_decimal()?;
        let target_value = self.field("Target")?.parse_decimal()?;
        if target_value <= 0.0 {
            return Err("Target must be greater than zero".to_string());
        }
        Ok(NewGoal {
            title: self.required_text("Title")?,
            current_value,
            target_value,
            unit: self.field("Unit")?.value.clone(),
            color: self.field("Color")?.value.clone(),
        })
    }

    pub fn to_profile_update(&self) -> Result<ProfileUpdate, String> {
        let username = self.required_text("Username")?;
        // ':' separates name and password in the Basic credential.
        if username.contains(':') {
            return Err("Username may not contain ':'".to_string());
        }
        Ok(ProfileUpdate {
            username,
            profile_picture_url: self.field("Picture URL")?.value.trim().to_string(),
        })
    }

    pub fn to_status(&self) -> Result<String, String> {
        self.required_text("Status")
    }

    pub fn to_work_request(&self) -> Result<WorkRequest, String> {
        let hours = self.field("Hours")?.parse_decimal()?;
        if hours <= 0.0 {
            return Err("Hours must be greater than zero".to_string());
        }
        Ok(WorkRequest::hours(hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: i64, title: &str) -> Goal {
        Goal {
            id,
            title: title.to_string(),
            current_value: 4.0,
            target_value: 50.0,
            unit: "XP".to_string(),
            color: "bg-purple-500".to_string(),
        }
    }

    fn type_str(form: &mut Form, s: &str) {
        for c in s.chars() {
            form.push_char(c);
        }
    }

    #[test]
    fn test_new_quest_defaults() {
        let mut form = Form::new_quest(&[]);
        type_str(&mut form, "Fix Login Bug");

        let quest = form.to_new_quest().unwrap();
        assert_eq!(quest.title, "Fix Login Bug");
        assert_eq!(quest.difficulty, Difficulty::Easy);
        assert_eq!(quest.earned_xp, 0);
        assert!(quest.goal.is_none());
    }

    #[test]
    fn test_new_quest_with_choices() {
        let mut form = Form::new_quest(&[goal(3, "Master Rust"), goal(8, "Evolve")]);
        type_str(&mut form, "Refactor");
        form.next_field();
        form.cycle_choice(true);
        form.cycle_choice(true);
        form.next_field();
        form.cycle_choice(false);

        let quest = form.to_new_quest().unwrap();
        assert_eq!(quest.difficulty, Difficulty::Hard);
        assert_eq!(quest.goal, Some(GoalRef { id: 8 }));
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut form = Form::new_quest(&[]);
        type_str(&mut form, "   ");
        assert_eq!(form.to_new_quest().unwrap_err(), "Title is required");
    }

    #[test]
    fn test_decimal_field_filters_input() {
        let mut form = Form::log_work();
        type_str(&mut form, "1a.5.2");
        assert_eq!(form.fields[0].value, "1.52");
        form.backspace();
        assert_eq!(form.to_work_request().unwrap().hours, 1.5);
    }

    #[test]
    fn test_zero_hours_rejected() {
        let mut form = Form::log_work();
        type_str(&mut form, "0");
        assert!(form.to_work_request().is_err());
    }

    #[test]
    fn test_edit_goal_prefills() {
        let form = Form::edit_goal(&goal(3, "Master Rust"));
        assert_eq!(form.kind, FormKind::EditGoal(3));

        let body = form.to_new_goal().unwrap();
        assert_eq!(body.title, "Master Rust");
        assert_eq!(body.current_value, 4.0);
        assert_eq!(body.target_value, 50.0);
        assert_eq!(body.unit, "XP");
        assert_eq!(body.color, "bg-purple-500");
    }

    #[test]
    fn test_new_goal_requires_target() {
        let mut form = Form::new_goal();
        type_str(&mut form, "Read more");
        assert_eq!(form.to_new_goal().unwrap_err(), "Target must be a number");
    }

    #[test]
    fn test_profile_username_rejects_colon() {
        let dashboard = Dashboard {
            trainer_name: "ash".to_string(),
            ..Default::default()
        };
        let mut form = Form::profile(&dashboard);
        assert_eq!(form.to_profile_update().unwrap().username, "ash");

        type_str(&mut form, ":b");
        assert_eq!(
            form.to_profile_update().unwrap_err(),
            "Username may not contain ':'"
        );
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::new_goal();
        form.prev_field();
        assert_eq!(form.focused().map(|f| f.label), Some("Color"));
        form.next_field();
        assert_eq!(form.focused().map(|f| f.label), Some("Title"));
    }

    #[test]
    fn test_space_cycles_choice() {
        let mut form = Form::new_goal();
        form.focus = 3;
        form.push_char(' ');
        assert_eq!(form.fields[3].value, "XP");
    }
}
