use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use questlog_core::auth::AuthMode;
use questlog_core::utils::{format_elapsed, truncate_string};

use crate::app::{App, AppState, DeleteTarget, LoginFocus, Tab};
use crate::form::{FieldInput, Form};

use super::styles;
use super::tabs::{achievements, admin, dashboard, goals, profile, quests};

const LOGO: [&str; 3] = [
    "   ╔═╗ ╦ ╦ ╔═╗ ╔═╗ ╔╦╗ ╦   ╔═╗ ╔═╗",
    "   ║═╬╗║ ║ ║╣  ╚═╗  ║  ║   ║ ║ ║ ╦",
    "   ╚═╝╚╚═╝ ╚═╝ ╚═╝  ╩  ╩═╝ ╚═╝ ╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete(target) => render_delete_overlay(frame, app, target),
        AppState::Editing(_) => {
            if let Some(ref form) = app.form {
                render_form_overlay(frame, form);
            }
        }
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  QUESTLOG";
    let trainer = app
        .dashboard
        .as_ref()
        .map(|d| format!("{} · Lv {} {}   ", d.trainer_name, d.level, d.pokemon_name))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.chars().count() + trainer.chars().count() + help_hint.len() + 2;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(trainer, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(vec![Line::from(""), title_line]).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::visible(app.is_admin()).iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            format!("[{}] {}", i + 1, tab.title()),
            styles::tab_style(*tab == app.current_tab),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Quests => quests::render(frame, app, area),
        Tab::Goals => goals::render(frame, app, area),
        Tab::Achievements => achievements::render(frame, app, area),
        Tab::Profile => profile::render(frame, app, area),
        Tab::Admin => admin::render(frame, app, area),
    }
}

fn shortcuts(tab: Tab) -> &'static str {
    match tab {
        Tab::Dashboard => "[w] log work | [u]pdate | [q]uit",
        Tab::Quests => "[n]ew | [s]tart | [f]inish | [d]elete | [q]uit",
        Tab::Goals => "[n]ew | [e]dit | [d]elete | [q]uit",
        Tab::Achievements => "[u]pdate | [q]uit",
        Tab::Profile => "[e]dit | [s]tatus | [L]ogout | [q]uit",
        Tab::Admin => "[d]elete user | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = app
        .status_message
        .as_ref()
        .map(|msg| format!(" {} ", msg))
        .unwrap_or_default();

    let timer_text = app
        .active_quest()
        .map(|id| {
            let title = app
                .quests
                .iter()
                .find(|q| q.id == id)
                .map(|q| q.title.as_str())
                .unwrap_or("Quest");
            let state = if app.is_finishing() { "turning in" } else { "⏱" };
            format!(" {} {} {} ", state, title, format_elapsed(app.elapsed_seconds()))
        })
        .unwrap_or_default();

    let right_text = format!(" {} ", shortcuts(app.current_tab));

    let width = area.width as usize;
    let padding = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(timer_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::styled(timer_text, styles::timer_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

fn help_row(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 30, frame.area());
    frame.render_widget(Clear, area);

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("               version {}", env!("CARGO_PKG_VERSION")),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_row("1-6", "Switch tabs"),
        help_row("←/→", "Prev/next tab"),
        help_row("↑/↓ j/k", "Navigate list"),
        help_row("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Quests", styles::highlight_style())),
        help_row("s/Enter", "Start timer on selected quest"),
        help_row("f", "Finish the running quest"),
        help_row("n", "Post a new quest"),
        help_row("d", "Delete selected quest"),
        Line::from(""),
        Line::from(Span::styled(" Everywhere", styles::highlight_style())),
        help_row("w", "Log work (Dashboard)"),
        help_row("e / s", "Edit profile / status (Profile)"),
        help_row("u", "Update all data"),
        help_row("L", "Log out"),
        help_row("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn field_style(focused: bool) -> Style {
    if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let username_focused = app.login_focus == LoginFocus::Username;
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<16}{}", app.login_username, cursor),
            field_style(username_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let masked = "*".repeat(app.login_password.chars().count().min(16));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{:<16}{}", masked, cursor),
            field_style(password_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let mode_focused = app.login_focus == LoginFocus::Mode;
    let (login_style, register_style) = match app.login_mode {
        AuthMode::Login => (styles::tab_style(true), styles::muted_style()),
        AuthMode::Register => (styles::muted_style(), styles::tab_style(true)),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("          "),
        Span::styled(if mode_focused { "◀ " } else { "  " }, styles::muted_style()),
        Span::styled("Login", login_style),
        Span::styled(" / ", styles::muted_style()),
        Span::styled("Register", register_style),
        Span::styled(if mode_focused { " ▶" } else { "  " }, styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let label = app.login_mode.title();
    let button = if button_focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(button, field_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_overlay(frame: &mut Frame, form: &Form) {
    let height = form.fields.len() as u16 * 2 + if form.error.is_some() { 7 } else { 5 };
    let area = centered_rect_fixed(60, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let value = match &field.input {
            FieldInput::Choice { .. } => format!("◀ {} ▶", field.value),
            FieldInput::Text | FieldInput::Decimal => {
                let cursor = if focused { "▌" } else { "" };
                format!("{}{}", field.value, cursor)
            }
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>12}: ", field.label), styles::muted_style()),
            Span::styled(value, field_style(focused)),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [Enter]", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("[Tab]", styles::help_key_style()),
        Span::styled(" next field  ", styles::muted_style()),
        Span::styled("[←/→]", styles::help_key_style()),
        Span::styled(" choose  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(format!(" {} ", form.kind.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm(frame: &mut Frame, question: String) {
    let area = centered_rect_fixed(52, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(format!("  {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to confirm, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    render_confirm(frame, "Are you sure you want to quit?".to_string());
}

fn render_delete_overlay(frame: &mut Frame, app: &App, target: DeleteTarget) {
    let name = truncate_string(&app.describe_target(target), 36);
    render_confirm(frame, format!("Delete {}?", name));
}
