//! Terminal UI rendering with ratatui

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use learnops_core::catalog::{
    earned_achievements, ACHIEVEMENTS, HOME_FEATURES, STATS, SUBJECT_PROGRESS, TAGLINE, TEAM, VALUES,
};
use learnops_core::chat::Sender;
use learnops_core::diagnostics::TestStatus;
use learnops_core::room::{RoomPhase, RoomView};
use learnops_core::whiteboard::Tool;

use crate::app::{App, AuthField, AuthMode, InputMode, RoomFocus, Screen, StatusLevel};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(1),    // Screen body
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);

    match app.screen {
        Screen::Home => draw_home(f, chunks[1]),
        Screen::About => draw_about(f, chunks[1]),
        Screen::Auth => draw_auth(f, app, chunks[1]),
        Screen::Services => draw_services(f, app, chunks[1]),
        Screen::Profile => draw_profile(f, app, chunks[1]),
        Screen::Room => draw_room(f, app, chunks[1]),
        Screen::Diagnostics => draw_diagnostics(f, app, chunks[1]),
    }

    draw_status_bar(f, app, chunks[2]);
}

/// Draw the title bar with the signed-in user
fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let screen = match app.screen {
        Screen::Home => "Home",
        Screen::About => "About",
        Screen::Auth => "Sign in",
        Screen::Services => "Services",
        Screen::Profile => "Profile",
        Screen::Room => "Session",
        Screen::Diagnostics => "API Diagnostics",
    };

    let (who, color) = match &app.user {
        Some(user) => (format!(" [{}]", user.name), Color::Green),
        None => (" [Signed out]".to_string(), Color::Yellow),
    };
    let busy = if app.is_busy() { " ..." } else { "" };

    let title_bar = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" LearnOps │ {} ", screen),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(who, Style::default().fg(color)),
        Span::styled(busy, Style::default().fg(Color::Cyan)),
    ]))
    .style(Style::default().bg(Color::DarkGray));

    f.render_widget(title_bar, area);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn draw_home(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        heading("Learn anything with a personal AI tutor"),
        Line::from(""),
        Line::from(TAGLINE),
        Line::from(""),
    ];
    for feature in HOME_FEATURES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<22}", feature.title), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(feature.description),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press 3 to browse sessions, a to sign in",
        Style::default().fg(Color::DarkGray),
    )));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Home "));
    f.render_widget(body, area);
}

fn draw_about(f: &mut Frame, area: Rect) {
    let mut lines = vec![heading("Our values")];
    for value in VALUES {
        lines.push(Line::from(format!("  {:<14} {}", value.title, value.description)));
    }

    lines.push(Line::from(""));
    lines.push(heading("By the numbers"));
    let stats: Vec<Span> = STATS
        .iter()
        .flat_map(|s| {
            [
                Span::styled(format!("  {} ", s.number), Style::default().fg(Color::Yellow)),
                Span::raw(s.label),
            ]
        })
        .collect();
    lines.push(Line::from(stats));

    lines.push(Line::from(""));
    lines.push(heading("Team"));
    for member in TEAM {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", member.name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(", {}", member.role), Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(format!("    {} [{}]", member.description, member.expertise.join(", "))));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" About "));
    f.render_widget(body, area);
}

fn draw_auth(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.auth_form;
    let title = match form.mode {
        AuthMode::SignIn => " Sign in ",
        AuthMode::SignUp => " Create account ",
    };

    let mut lines = Vec::new();
    for &field in form.fields() {
        let label = match field {
            AuthField::Name => "Full name",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
            AuthField::Confirm => "Confirm password",
        };
        let value = match field {
            AuthField::Password | AuthField::Confirm => "•".repeat(form.field(field).chars().count()),
            _ => form.field(field).to_string(),
        };
        let focused = field == form.focus;
        let marker = if focused { "> " } else { "  " };
        let style = if focused && app.input_mode == InputMode::Editing {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<18}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value, style),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    } else if app.auth_pending {
        lines.push(Line::from(Span::styled("Please wait...", Style::default().fg(Color::Cyan))));
    }

    let switch_hint = match form.mode {
        AuthMode::SignIn => "Don't have an account? Press t to sign up (in normal mode)",
        AuthMode::SignUp => "Already have an account? Press t to sign in (in normal mode)",
    };
    lines.push(Line::from(Span::styled(switch_hint, Style::default().fg(Color::DarkGray))));

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, area);
}

fn draw_services(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = app
        .offers
        .iter()
        .enumerate()
        .map(|(i, offer)| {
            let style = if i == app.offer_cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let line = format!("{} {:<28} {:<20} {}", offer.avatar, offer.subject, offer.tutor, offer.description);
            ListItem::new(Line::from(Span::styled(line, style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Tutoring sessions "));
    f.render_widget(list, chunks[0]);

    let (text, style) = if let Some(stage) = &app.launch_stage {
        (stage.to_string(), Style::default().fg(Color::Cyan))
    } else if let Some(error) = &app.launch_error {
        (error.clone(), Style::default().fg(Color::Red))
    } else {
        (
            "Enter: start session │ h: check video service".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    let footer = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[1]);
}

fn draw_profile(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");

    if app.user.is_none() {
        let body = Paragraph::new("Sign in to see your profile (press a)").block(block);
        f.render_widget(body, area);
        return;
    }

    let mut lines = Vec::new();
    match &app.profile {
        Some(profile) => {
            let name = if app.input_mode == InputMode::Editing {
                format!("{}_", app.name_input)
            } else {
                profile.display_name().to_string()
            };
            lines.push(Line::from(vec![
                Span::styled("Name     ", Style::default().fg(Color::DarkGray)),
                Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Email    ", Style::default().fg(Color::DarkGray)),
                Span::raw(profile.email.clone()),
            ]));
            if let Some(created) = &profile.created_at {
                lines.push(Line::from(vec![
                    Span::styled("Joined   ", Style::default().fg(Color::DarkGray)),
                    Span::raw(created.clone()),
                ]));
            }
        }
        None if app.profile_loading => lines.push(Line::from("Loading profile...")),
        None => lines.push(Line::from("Profile not loaded (press r)")),
    }

    lines.push(Line::from(""));
    lines.push(heading(&format!(
        "Achievements ({}/{})",
        earned_achievements(),
        ACHIEVEMENTS.len()
    )));
    for achievement in ACHIEVEMENTS {
        let (mark, color) = if achievement.earned {
            ("✔", Color::Green)
        } else {
            ("·", Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", mark), Style::default().fg(color)),
            Span::styled(format!("{:<20}", achievement.name), Style::default().fg(color)),
            Span::raw(achievement.description),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(heading("Subjects"));
    for subject in SUBJECT_PROGRESS {
        lines.push(Line::from(format!(
            "  {:<14} {:<14} {} sessions",
            subject.name, subject.level, subject.sessions
        )));
    }

    let body = Paragraph::new(lines).block(block);
    f.render_widget(body, area);
}

fn draw_room(f: &mut Frame, app: &App, area: Rect) {
    let Some(room) = &app.room else {
        return;
    };

    let bundle = match room.phase() {
        RoomPhase::Ready(bundle) => bundle,
        RoomPhase::Error(message) => return draw_session_error(f, message, area),
        RoomPhase::Closed => return draw_session_error(f, "This session has ended.", area),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} {} ", bundle.session.avatar, bundle.session.subject),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("with {} ", bundle.session.tutor), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("│ room {} ", bundle.room.room_name), Style::default().fg(Color::DarkGray)),
        Span::raw("│ "),
        media_span("cam", room.media.camera),
        media_span("mic", room.media.microphone),
        media_span("screen", room.media.screen_share),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_chat(f, app, room, panels[0]);
    draw_whiteboard(f, app, room, panels[1]);
}

fn media_span(label: &str, on: bool) -> Span<'static> {
    let (text, color) = if on {
        (format!("{} on ", label), Color::Green)
    } else {
        (format!("{} off ", label), Color::Red)
    };
    Span::styled(text, Style::default().fg(color))
}

fn draw_session_error(f: &mut Frame, message: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Session Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start a new session",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_chat(f: &mut Frame, app: &App, room: &RoomView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let visible = chunks[0].height.saturating_sub(2) as usize;
    let messages = room.chat.messages();
    let start = messages.len().saturating_sub(visible);

    let items: Vec<ListItem> = messages[start..]
        .iter()
        .map(|m| {
            let (who, color) = match m.sender {
                Sender::User => ("You", Color::Yellow),
                Sender::Ai => ("Tutor", Color::Cyan),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", m.timestamp.format("%H:%M")), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{}: ", who), Style::default().fg(color)),
                Span::raw(m.text.clone()),
            ]))
        })
        .collect();

    let title = if room.chat.is_awaiting_reply() {
        " Chat (tutor is typing...) "
    } else {
        " Chat "
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(app.room_focus == RoomFocus::Chat))
            .title(title),
    );
    f.render_widget(list, chunks[0]);

    let editing = app.input_mode == InputMode::Editing;
    let input = Paragraph::new(app.chat_input.as_str()).block(Block::default().borders(Borders::ALL).title(
        if editing { " Message (Enter to send) " } else { " i: type a message " },
    ));
    f.render_widget(input, chunks[1]);

    if editing {
        let x = chunks[1].x + 1 + app.chat_input.chars().count() as u16;
        f.set_cursor_position((x, chunks[1].y + 1));
    }
}

fn draw_whiteboard(f: &mut Frame, app: &App, room: &RoomView, area: Rect) {
    let board = &room.whiteboard;
    let (cx, cy) = board.cursor();
    let focused = app.room_focus == RoomFocus::Whiteboard;

    let lines: Vec<Line> = board
        .rows('█')
        .into_iter()
        .enumerate()
        .map(|(y, row)| {
            if !focused || y as u16 != cy {
                return Line::from(row);
            }
            // Highlight the cursor cell
            let chars: Vec<char> = row.chars().collect();
            let at = cx as usize;
            let before: String = chars[..at].iter().collect();
            let cell: String = chars[at..=at].iter().collect();
            let after: String = chars[at + 1..].iter().collect();
            Line::from(vec![
                Span::raw(before),
                Span::styled(cell, Style::default().bg(Color::Cyan)),
                Span::raw(after),
            ])
        })
        .collect();

    let tool = match board.tool() {
        Tool::Pen => "pen",
        Tool::Eraser => "eraser",
    };
    let title = format!(
        " Whiteboard ({}{}) ",
        tool,
        if board.is_drawing() { ", drawing" } else { "" }
    );

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(title),
    );
    f.render_widget(body, area);
}

fn draw_diagnostics(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .test_results
        .iter()
        .map(|result| {
            let (icon, color) = match result.status {
                TestStatus::Pending => ("○", Color::DarkGray),
                TestStatus::Success => ("✔", Color::Green),
                TestStatus::Error => ("✘", Color::Red),
            };
            let timestamp = result.timestamp.as_deref().unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", icon), Style::default().fg(color)),
                Span::styled(format!("{:<22}", result.name), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("{:<10}", timestamp), Style::default().fg(Color::DarkGray)),
                Span::styled(result.message.clone(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let title = if app.diagnostics_running {
        format!(" API Diagnostics │ {} (running...) ", app.config.api.base_url)
    } else {
        format!(" API Diagnostics │ {} (r: run all tests) ", app.config.api.base_url)
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some((ref msg, ref level)) = app.status_message {
        let color = match level {
            StatusLevel::Info => Color::Blue,
            StatusLevel::Success => Color::Green,
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        (msg.clone(), Style::default().fg(color))
    } else {
        // Default hints based on mode and screen
        let hints = match (app.input_mode, app.screen) {
            (InputMode::Editing, _) => "Type │ Tab:next field │ Enter:submit │ Esc:cancel",
            (InputMode::Normal, Screen::Room) => {
                "Tab:chat/whiteboard │ i:type │ c/m/s:cam/mic/screen │ space:pen │ p/e:pen/eraser x:clear │ L:leave"
            }
            (InputMode::Normal, Screen::Services) => "j↓ k↑ │ Enter:start │ h:video health │ ?:help q:quit",
            (InputMode::Normal, Screen::Profile) => "e:edit name │ r:reload │ ?:help q:quit",
            (InputMode::Normal, Screen::Auth) => "i:edit │ t:sign in/up │ Enter:submit │ q:quit",
            (InputMode::Normal, _) => "1:home 2:about 3:services 4:profile 5:diagnostics │ a:sign in o:sign out │ q:quit",
        };
        (hints.to_string(), Style::default().fg(Color::DarkGray))
    };

    let status_bar = Paragraph::new(text).style(style);
    f.render_widget(status_bar, area);
}
