use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use questlog_core::utils::truncate_string;

use super::progress_bar;
use crate::app::App;
use crate::ui::styles;

const BAR_WIDTH: usize = 20;

/// Format a goal value in its unit, e.g. "12.5 hours" or "800 XP"
fn format_value(value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    };
    match unit {
        "percent" => format!("{}%", number),
        _ => format!("{} {}", number, unit),
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .goals
        .iter()
        .enumerate()
        .map(|(i, goal)| {
            let title_style = if i == app.goal_selection {
                styles::selected_style()
            } else if goal.is_complete() {
                styles::completed_style()
            } else {
                styles::list_item_style()
            };
            let bar_style = Style::default().fg(styles::goal_color(&goal.color));

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<30}", truncate_string(&goal.title, 30)),
                    title_style,
                ),
                Span::styled(progress_bar(goal.progress(), BAR_WIDTH), bar_style),
                Span::styled(
                    format!(" {:>3.0}% ", goal.progress() * 100.0),
                    styles::highlight_style(),
                ),
                Span::styled(
                    format!(
                        "{} / {}",
                        format_value(goal.current_value, &goal.unit),
                        format_value(goal.target_value, &goal.unit)
                    ),
                    styles::muted_style(),
                ),
            ]))
        })
        .collect();

    let done = app.goals.iter().filter(|g| g.is_complete()).count();
    let block = Block::default()
        .title(format!(" Goals ({}/{} reached) ", done, app.goals.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.goal_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0, "hours"), "12 hours");
        assert_eq!(format_value(12.5, "hours"), "12.5 hours");
        assert_eq!(format_value(800.0, "XP"), "800 XP");
        assert_eq!(format_value(40.0, "percent"), "40%");
    }
}
