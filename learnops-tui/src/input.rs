//! Keyboard input handling with vim-style bindings

use crossterm::event::{KeyCode, KeyEvent};
use learnops_core::room::RoomPhase;
use learnops_core::whiteboard::Tool;

use crate::app::{App, AppResult, InputMode, RoomFocus, Screen, StatusLevel};

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> AppResult {
    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

/// Handle keys in normal mode (screen navigation and actions)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> AppResult {
    if key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
        return AppResult::Quit;
    }

    // Screen switching, except while in a room
    if app.screen != Screen::Room {
        let target = match key.code {
            KeyCode::Char('1') => Some(Screen::Home),
            KeyCode::Char('2') => Some(Screen::About),
            KeyCode::Char('3') => Some(Screen::Services),
            KeyCode::Char('4') => Some(Screen::Profile),
            KeyCode::Char('5') => Some(Screen::Diagnostics),
            KeyCode::Char('a') => Some(Screen::Auth),
            _ => None,
        };
        if let Some(screen) = target {
            app.go_to(screen);
            return AppResult::Continue;
        }
    }

    match app.screen {
        Screen::Home | Screen::About => handle_common(app, key),
        Screen::Auth => handle_auth(app, key),
        Screen::Services => handle_services(app, key),
        Screen::Profile => handle_profile(app, key),
        Screen::Room => handle_room(app, key),
        Screen::Diagnostics => handle_diagnostics(app, key),
    }

    AppResult::Continue
}

fn handle_common(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('o') => app.sign_out(),
        KeyCode::Esc => app.clear_status(),
        KeyCode::Char('?') => app.set_status(
            "1:home 2:about 3:services 4:profile 5:diagnostics a:sign in o:sign out q:quit",
            StatusLevel::Info,
        ),
        _ => {}
    }
}

fn handle_auth(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('t') => app.auth_form.toggle_mode(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.auth_form.focus_next(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.auth_form.focus_prev(),
        KeyCode::Enter => app.submit_auth(),
        _ => handle_common(app, key),
    }
}

fn handle_services(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.offer_down(),
        KeyCode::Char('k') | KeyCode::Up => app.offer_up(),
        KeyCode::Enter => app.launch_selected(),
        KeyCode::Char('h') => app.check_transport(),
        _ => handle_common(app, key),
    }
}

fn handle_profile(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.start_name_edit(),
        KeyCode::Char('r') => app.load_profile(),
        _ => handle_common(app, key),
    }
}

fn handle_diagnostics(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.run_diagnostics(),
        _ => handle_common(app, key),
    }
}

fn handle_room(app: &mut App, key: KeyEvent) {
    let phase_is_ready = app
        .room
        .as_ref()
        .is_some_and(|room| matches!(room.phase(), RoomPhase::Ready(_)));

    if !phase_is_ready {
        // Session error screen: only a way back
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.start_new_session();
        }
        return;
    }

    match key.code {
        KeyCode::Char('L') => return app.leave_room(),
        KeyCode::Tab => {
            app.room_focus = match app.room_focus {
                RoomFocus::Chat => RoomFocus::Whiteboard,
                RoomFocus::Whiteboard => RoomFocus::Chat,
            };
            return;
        }
        _ => {}
    }

    let Some(room) = app.room.as_mut() else {
        return;
    };

    match (app.room_focus, key.code) {
        (_, KeyCode::Char('c')) => {
            room.media.toggle_camera();
        }
        (_, KeyCode::Char('m')) => {
            room.media.toggle_microphone();
        }
        (_, KeyCode::Char('s')) => {
            room.media.toggle_screen_share();
        }
        (RoomFocus::Chat, KeyCode::Char('i') | KeyCode::Enter) => app.input_mode = InputMode::Editing,

        // Whiteboard
        (RoomFocus::Whiteboard, KeyCode::Char('h') | KeyCode::Left) => room.whiteboard.move_cursor(-1, 0),
        (RoomFocus::Whiteboard, KeyCode::Char('l') | KeyCode::Right) => room.whiteboard.move_cursor(1, 0),
        (RoomFocus::Whiteboard, KeyCode::Char('k') | KeyCode::Up) => room.whiteboard.move_cursor(0, -1),
        (RoomFocus::Whiteboard, KeyCode::Char('j') | KeyCode::Down) => room.whiteboard.move_cursor(0, 1),
        (RoomFocus::Whiteboard, KeyCode::Char(' ')) => room.whiteboard.toggle_drawing(),
        (RoomFocus::Whiteboard, KeyCode::Enter) => room.whiteboard.apply(),
        (RoomFocus::Whiteboard, KeyCode::Char('p')) => room.whiteboard.set_tool(Tool::Pen),
        (RoomFocus::Whiteboard, KeyCode::Char('e')) => room.whiteboard.set_tool(Tool::Eraser),
        (RoomFocus::Whiteboard, KeyCode::Char('x')) => room.whiteboard.clear(),
        _ => {}
    }
}

/// Handle keys while typing into a form field or the chat box
fn handle_editing_mode(app: &mut App, key: KeyEvent) -> AppResult {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return AppResult::Continue;
    }

    match app.screen {
        Screen::Auth => match key.code {
            KeyCode::Enter => app.submit_auth(),
            KeyCode::Tab | KeyCode::Down => app.auth_form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.auth_form.focus_prev(),
            KeyCode::Backspace => {
                let focus = app.auth_form.focus;
                app.auth_form.field_mut(focus).pop();
            }
            KeyCode::Char(c) => {
                let focus = app.auth_form.focus;
                app.auth_form.field_mut(focus).push(c);
            }
            _ => {}
        },
        Screen::Profile => match key.code {
            KeyCode::Enter => app.save_name(),
            KeyCode::Backspace => {
                app.name_input.pop();
            }
            KeyCode::Char(c) => app.name_input.push(c),
            _ => {}
        },
        Screen::Room => match key.code {
            KeyCode::Enter => app.send_chat(),
            KeyCode::Backspace => {
                app.chat_input.pop();
            }
            KeyCode::Char(c) => app.chat_input.push(c),
            _ => {}
        },
        _ => app.input_mode = InputMode::Normal,
    }

    AppResult::Continue
}
