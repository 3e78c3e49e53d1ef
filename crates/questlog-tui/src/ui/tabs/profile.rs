use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match app.dashboard.as_ref() {
        Some(dashboard) => {
            let picture = dashboard
                .profile_picture_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| "(none)".to_string());
            let status = dashboard
                .status
                .clone()
                .unwrap_or_else(|| "(none)".to_string());
            vec![
                Line::from(vec![
                    Span::styled("Username:  ", styles::muted_style()),
                    Span::styled(dashboard.trainer_name.clone(), styles::highlight_style()),
                ]),
                Line::from(vec![
                    Span::styled("Picture:   ", styles::muted_style()),
                    Span::raw(picture),
                ]),
                Line::from(vec![
                    Span::styled("Status:    ", styles::muted_style()),
                    Span::raw(status),
                ]),
                Line::from(vec![
                    Span::styled("Server:    ", styles::muted_style()),
                    Span::raw(app.config.api_url.clone()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[e]", styles::help_key_style()),
                    Span::styled(" edit profile  ", styles::muted_style()),
                    Span::styled("[s]", styles::help_key_style()),
                    Span::styled(" set status  ", styles::muted_style()),
                    Span::styled("[L]", styles::help_key_style()),
                    Span::styled(" log out", styles::muted_style()),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "Changing your username signs you out.",
                    styles::muted_style(),
                )),
            ]
        }
        None => vec![Line::from(Span::styled("Loading...", styles::muted_style()))],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
