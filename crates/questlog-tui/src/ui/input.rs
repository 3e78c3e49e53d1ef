//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};
use crate::form::FormKind;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let state = app.state;
    match state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Editing(_) => {
            handle_form_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete(target) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete(target);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    let is_admin = app.is_admin();
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = Tab::visible(is_admin).get(index) {
                app.current_tab = *tab;
            }
        }
        KeyCode::Left => app.current_tab = app.current_tab.prev(is_admin),
        KeyCode::Right => app.current_tab = app.current_tab.next(is_admin),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Char('u') => app.refresh_all(),
        KeyCode::Char('f') => app.finish_active_quest(),
        KeyCode::Char('L') => app.logout(),
        _ => match app.current_tab {
            Tab::Dashboard => handle_dashboard_input(app, key),
            Tab::Quests => handle_quests_input(app, key),
            Tab::Goals => handle_goals_input(app, key),
            Tab::Profile => handle_profile_input(app, key),
            Tab::Admin => handle_admin_input(app, key),
            Tab::Achievements => {}
        },
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Mode,
                LoginFocus::Mode => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Mode => LoginFocus::Password,
                LoginFocus::Button => LoginFocus::Mode,
            };
        }
        KeyCode::Left | KeyCode::Right if app.login_focus == LoginFocus::Mode => {
            app.login_mode = app.login_mode.toggle();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login().await,
            LoginFocus::Mode => app.login_mode = app.login_mode.toggle(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Mode | LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Mode => {
                if c == ' ' {
                    app.login_mode = app.login_mode.toggle();
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_form();
            return;
        }
        KeyCode::Enter => {
            app.submit_form();
            return;
        }
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('w') {
        app.open_form(FormKind::LogWork);
    }
}

fn handle_quests_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.open_form(FormKind::NewQuest),
        KeyCode::Char('s') | KeyCode::Enter => app.start_selected_quest(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        _ => {}
    }
}

fn handle_goals_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.open_form(FormKind::NewGoal),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = app.selected_goal_id() {
                app.open_form(FormKind::EditGoal(id));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.open_form(FormKind::Profile),
        KeyCode::Char('s') => app.open_form(FormKind::Status),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Char('d') | KeyCode::Delete) {
        app.request_delete();
    }
}
