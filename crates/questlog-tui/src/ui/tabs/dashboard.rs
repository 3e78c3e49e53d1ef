use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, List, ListItem, Paragraph},
    Frame,
};

use questlog_core::models::dashboard::XP_PER_LEVEL;
use questlog_core::utils::{format_elapsed, format_hours};

use crate::app::App;
use crate::ui::styles;

/// Recent work sessions shown on the dashboard
const RECENT_SESSIONS: usize = 10;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Length(3), Constraint::Min(3)])
        .split(chunks[0]);

    render_trainer_card(frame, app, left[0]);
    render_xp_gauge(frame, app, left[1]);
    render_active_quest(frame, app, left[2]);
    render_work_sessions(frame, app, chunks[1]);
}

fn render_trainer_card(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Trainer ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(dashboard) = app.dashboard.as_ref() else {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Loading...",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };

    let lines = vec![
        row("Trainer", dashboard.trainer_name.clone()),
        row(
            "Companion",
            format!("{} ({})", dashboard.pokemon_name, dashboard.evolution_stage),
        ),
        row("Level", dashboard.level.to_string()),
        row("Total XP", dashboard.total_xp.to_string()),
        row(
            "Status",
            dashboard.status.clone().unwrap_or_else(|| "-".to_string()),
        ),
        row("Role", dashboard.role.clone()),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_xp_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let (ratio, label) = match app.dashboard.as_ref() {
        Some(d) => (
            d.level_progress(),
            format!(" {}/{} XP ", d.current_xp, XP_PER_LEVEL),
        ),
        None => (0.0, " - ".to_string()),
    };

    let gauge = LineGauge::default()
        .block(
            Block::default()
                .title(" Next level ")
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .ratio(ratio)
        .label(label)
        .filled_symbol(symbols::line::THICK_HORIZONTAL)
        .unfilled_symbol("╌")
        .filled_style(styles::highlight_style())
        .unfilled_style(styles::muted_style());
    frame.render_widget(gauge, area);
}

fn render_active_quest(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Active quest ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.active_quest().is_some()));

    let line = match app.active_quest() {
        Some(id) => {
            let title = app
                .quests
                .iter()
                .find(|q| q.id == id)
                .map(|q| q.title.clone())
                .unwrap_or_else(|| format!("Quest #{}", id));
            Line::from(vec![
                Span::styled(format_elapsed(app.elapsed_seconds()), styles::timer_style()),
                Span::raw("  "),
                Span::styled(title, styles::list_item_style()),
                Span::styled("  [f] finish", styles::muted_style()),
            ])
        }
        None => Line::from(Span::styled(
            "No quest running. Start one from the Quests tab.",
            styles::muted_style(),
        )),
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_work_sessions(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .work_sessions
        .iter()
        .take(RECENT_SESSIONS)
        .map(|session| {
            let start = session
                .start_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", session.work_date.format("%Y-%m-%d").to_string()),
                    styles::list_item_style(),
                ),
                Span::styled(format!("{:<7}", start), styles::muted_style()),
                Span::styled(format_hours(session.hours), styles::success_style()),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(" Work log ({}) ", app.work_sessions.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(List::new(items).block(block), area);
}
