//! Style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{message::Sender, status::ConnectionStatus};

// =============================================================================
// Header styles
// =============================================================================

/// Style for the app title.
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Connection indicator colour follows the connection state.
pub fn connection_style(status: ConnectionStatus) -> Style {
    let color = match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Connecting => Color::Yellow,
        ConnectionStatus::Disconnected => Color::Red,
    };
    Style::default().fg(color)
}

/// Style for the last stream error under the header.
pub fn error_style() -> Style {
    Style::default().fg(Color::LightRed)
}

// =============================================================================
// Message list styles
// =============================================================================

pub fn sender_style(sender: Sender) -> Style {
    let color = match sender {
        Sender::You => Color::Cyan,
        Sender::Patient => Color::White,
        Sender::System => Color::Magenta,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn message_time_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn message_text_style() -> Style {
    Style::default().fg(Color::White)
}

/// Marker appended to entries that failed to deliver.
pub fn failed_marker_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// Live, not yet committed text (own draft or the counterpart typing).
pub fn live_preview_style() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

pub fn placeholder_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// =============================================================================
// Input styles
// =============================================================================

pub fn input_prompt_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
