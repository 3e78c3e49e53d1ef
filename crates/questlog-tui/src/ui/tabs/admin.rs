use ratatui::{
    layout::{Constraint, Rect},
    text::Text,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["ID", "Username", "Role", "Level"])
        .style(styles::highlight_style())
        .bottom_margin(1);

    let rows: Vec<Row> = app
        .admin_users
        .iter()
        .map(|user| {
            Row::new(vec![
                Cell::from(user.id.to_string()),
                Cell::from(Text::from(user.username.clone())),
                Cell::from(user.role.clone()),
                Cell::from(user.level.to_string()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .row_highlight_style(styles::selected_style())
    .block(
        Block::default()
            .title(format!(" Users ({}) [d] delete ", app.admin_users.len()))
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    let mut state = TableState::default();
    state.select(Some(app.admin_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
