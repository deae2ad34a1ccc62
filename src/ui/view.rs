use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    domain::{
        draft_state::DraftState,
        message::{DeliveryStatus, Message, Sender},
        shell_state::ShellState,
        status::{ConnectionStatus, SessionStatus},
    },
    usecases::chat_session::ChatSession,
};

use super::styles;

const APP_TITLE: &str = "roomchat";
const PROMPT_SYMBOL: &str = "> ";
const PLACEHOLDER_TEXT: &str = "Write your message";
const KEY_HINTS: &str = "Enter: send | Ctrl+L: clear all | Ctrl+Y: copy room link | Esc: quit";

pub fn render(frame: &mut Frame<'_>, state: &ShellState, session: &ChatSession) {
    let [header_area, messages_area, input_area, hint_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    frame.render_widget(Paragraph::new(header_lines(session)), header_area);
    render_messages_panel(frame, messages_area, session);
    render_input(frame, input_area, session.draft(), session.has_pending_draft());

    let hint = match state.notice() {
        Some(notice) => Line::from(notice.to_owned()),
        None => Line::styled(KEY_HINTS, styles::hint_style()),
    };
    frame.render_widget(Paragraph::new(hint), hint_area);
}

fn header_lines(session: &ChatSession) -> Vec<Line<'static>> {
    let status = session.status();
    let room = match session.chat_id() {
        Some(chat_id) => format!("Room: {chat_id}"),
        None => "No room".to_owned(),
    };

    let title = Line::from(vec![
        Span::styled(APP_TITLE, styles::title_style()),
        Span::raw("  "),
        Span::styled(
            connection_label(status),
            styles::connection_style(status.connection),
        ),
        Span::raw("  "),
        Span::raw(room),
    ]);

    let error = match status.last_error.as_deref() {
        Some(error) if !status.is_connected() => Line::styled(error.to_owned(), styles::error_style()),
        _ => Line::default(),
    };

    vec![title, error]
}

fn connection_label(status: &SessionStatus) -> String {
    let icon = match status.connection {
        ConnectionStatus::Connected => "🟢",
        ConnectionStatus::Connecting => "🟡",
        ConnectionStatus::Disconnected => "🔴",
    };
    format!("{icon} {}", status.connection.as_label())
}

fn render_messages_panel(frame: &mut Frame<'_>, area: Rect, session: &ChatSession) {
    let block = Block::default()
        .title("Messages (newest first)")
        .borders(Borders::ALL);

    let mut items = Vec::new();
    if let Some(text) = session.counterpart_draft() {
        items.push(live_item(Sender::Patient.display_label(), text));
    }
    let own_draft = session.draft().text();
    if !own_draft.trim().is_empty() {
        items.push(live_item(Sender::You.display_label(), own_draft));
    }
    items.extend(session.messages().iter().map(message_item));

    if items.is_empty() {
        let empty = Paragraph::new(Line::styled("No messages yet", styles::placeholder_style()))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    frame.render_widget(List::new(items).block(block), area);
}

fn live_item(label: &str, text: &str) -> ListItem<'static> {
    ListItem::new(Line::styled(
        format!("{label} is typing: {text}"),
        styles::live_preview_style(),
    ))
}

fn message_item(message: &Message) -> ListItem<'static> {
    ListItem::new(message_line(message))
}

fn message_line(message: &Message) -> Line<'static> {
    let mut spans = Vec::with_capacity(5);

    let time = display_time(&message.time);
    if !time.is_empty() {
        spans.push(Span::styled(format!("{time} "), styles::message_time_style()));
    }
    spans.push(Span::styled(
        format!("{}: ", message.sender.display_label()),
        styles::sender_style(message.sender),
    ));
    spans.push(Span::styled(
        message.text.clone(),
        styles::message_text_style(),
    ));

    match message.status {
        DeliveryStatus::Failed => {
            spans.push(Span::styled(" ✗ not delivered", styles::failed_marker_style()));
        }
        DeliveryStatus::Pending => {
            spans.push(Span::styled(" …", styles::message_time_style()));
        }
        DeliveryStatus::Sent => {}
    }

    Line::from(spans)
}

/// Server timestamps in RFC 3339 are shown as local `HH:MM`; anything else is
/// already a display label and passes through.
fn display_time(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string(),
        Err(_) => raw.to_owned(),
    }
}

fn render_input(frame: &mut Frame<'_>, area: Rect, draft: &DraftState, pending: bool) {
    let title = if pending {
        "New message (syncing)"
    } else {
        "New message"
    };

    let line = if draft.text().is_empty() {
        Line::from(vec![
            Span::styled(PROMPT_SYMBOL, styles::input_prompt_style()),
            Span::styled(PLACEHOLDER_TEXT, styles::placeholder_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled(PROMPT_SYMBOL, styles::input_prompt_style()),
            Span::raw(draft.text().to_owned()),
        ])
    };

    let inner_width = area.width.saturating_sub(2);
    let cursor_column = input_cursor_column(draft);
    let scroll = horizontal_scroll(cursor_column, inner_width);

    let paragraph = Paragraph::new(line)
        .scroll((0, scroll))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(paragraph, area);

    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(cursor_column.saturating_sub(scroll));
    frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
}

/// Display column of the cursor, counting the prompt and wide characters.
fn input_cursor_column(draft: &DraftState) -> u16 {
    let before_cursor: String = draft.text().chars().take(draft.cursor()).collect();
    let width = PROMPT_SYMBOL.width() + before_cursor.width();
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn horizontal_scroll(cursor_column: u16, inner_width: u16) -> u16 {
    if inner_width == 0 || cursor_column < inner_width {
        0
    } else {
        cursor_column - inner_width + 1
    }
}
