use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::progress_bar;
use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_badge_list(frame, app, chunks[0]);
    render_badge_detail(frame, app, chunks[1]);
}

fn render_badge_list(frame: &mut Frame, app: &App, area: Rect) {
    let badges = &app.achievements.badges;
    let items: Vec<ListItem> = badges
        .iter()
        .enumerate()
        .map(|(i, badge)| {
            let (mark, mark_style) = if badge.unlocked {
                ("★ ", styles::success_style())
            } else {
                ("☆ ", styles::muted_style())
            };
            let style = if i == app.badge_selection {
                styles::selected_style()
            } else if badge.unlocked {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, mark_style),
                Span::styled(format!("{} {}", badge.icon, badge.name), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(
            " Badges ({}/{}) ",
            app.achievements.unlocked_count,
            badges.len()
        ))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.badge_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_badge_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.achievements.badges.get(app.badge_selection) {
        Some(badge) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("{} {}", badge.icon, badge.name),
                    styles::highlight_style(),
                )),
                Line::from(""),
                Line::from(badge.desc.clone()),
                Line::from(""),
            ];
            if badge.unlocked {
                lines.push(Line::from(Span::styled("Unlocked", styles::success_style())));
            } else {
                lines.push(Line::from(vec![
                    Span::styled(progress_bar(badge.progress(), 20), styles::highlight_style()),
                    Span::styled(
                        format!(" {}/{}", badge.current_progress, badge.target_progress),
                        styles::muted_style(),
                    ),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled("No badges", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Badge ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
