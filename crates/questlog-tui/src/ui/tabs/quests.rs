use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use questlog_core::models::Quest;
use questlog_core::utils::{format_elapsed, truncate_string};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_quest_list(frame, app, chunks[0]);
    render_quest_detail(frame, app, chunks[1]);
}

fn render_quest_list(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.active_quest();
    let open = app.quests.iter().filter(|q| !q.completed).count();

    let items: Vec<ListItem> = app
        .quests
        .iter()
        .enumerate()
        .map(|(i, quest)| {
            let running = active == Some(quest.id);
            let marker = if running {
                "▶ "
            } else if quest.completed {
                "✓ "
            } else {
                "  "
            };

            let title_style = if i == app.quest_selection {
                styles::selected_style()
            } else if quest.completed {
                styles::completed_style()
            } else {
                styles::list_item_style()
            };

            let mut spans = vec![
                Span::styled(marker, styles::timer_style()),
                Span::styled(
                    format!("{:<32}", truncate_string(&quest.title, 32)),
                    title_style,
                ),
                Span::styled(
                    format!(" {:<7}", quest.difficulty.label()),
                    styles::difficulty_style(quest.difficulty),
                ),
            ];
            if running {
                spans.push(Span::styled(
                    format_elapsed(app.elapsed_seconds()),
                    styles::timer_style(),
                ));
            } else if quest.completed {
                spans.push(Span::styled(
                    format!("+{} XP", quest.earned_xp),
                    styles::success_style(),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .title(format!(" Quests ({} open) ", open))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.quest_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn detail_lines(app: &App, quest: &Quest) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(quest.title.clone(), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Difficulty: ", styles::muted_style()),
            Span::styled(
                quest.difficulty.label(),
                styles::difficulty_style(quest.difficulty),
            ),
        ]),
    ];

    if let Some(goal_ref) = quest.goal.as_ref() {
        let goal_title = app
            .goals
            .iter()
            .find(|g| g.id == goal_ref.id)
            .map(|g| g.title.clone())
            .unwrap_or_else(|| format!("#{}", goal_ref.id));
        lines.push(Line::from(vec![
            Span::styled("Goal:       ", styles::muted_style()),
            Span::raw(goal_title),
        ]));
    }
    lines.push(Line::from(""));

    if quest.completed {
        lines.push(Line::from(Span::styled(
            format!("Completed for {} XP", quest.earned_xp),
            styles::success_style(),
        )));
        return lines;
    }

    match app.active_quest() {
        Some(id) if id == quest.id => {
            let elapsed = app.elapsed_seconds();
            lines.push(Line::from(vec![
                Span::styled("Elapsed:    ", styles::muted_style()),
                Span::styled(format_elapsed(elapsed), styles::timer_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Reward:     ", styles::muted_style()),
                Span::raw(format!(
                    "~{} XP",
                    Quest::projected_xp(elapsed as f64 / 3600.0)
                )),
            ]));
            lines.push(Line::from(""));
            let hint = if app.is_finishing() {
                "Turning in..."
            } else {
                "Press [f] to finish"
            };
            lines.push(Line::from(Span::styled(hint, styles::muted_style())));
        }
        Some(_) => lines.push(Line::from(Span::styled(
            "Another quest is running",
            styles::muted_style(),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Press [s] to start the timer",
            styles::muted_style(),
        ))),
    }

    lines
}

fn render_quest_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.quests.get(app.quest_selection) {
        Some(quest) => detail_lines(app, quest),
        None => vec![Line::from(Span::styled(
            "No quests yet. Press [n] to post one.",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
