use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::theme::Palette;
use crate::models::display_name;

/// Center `label` within `width` columns, truncating when it does not fit.
pub(crate) fn centered_label(label: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut text: String = label.trim().chars().take(width).collect();
    let len = text.chars().count();
    let padding = width - len;
    let left = padding / 2;
    let right = padding - left;
    text.insert_str(0, &" ".repeat(left));
    text.push_str(&" ".repeat(right));
    text
}

/// Build the text of one catalog card: the display name, then the nickname of
/// a persisted capture if there is one.
pub(crate) fn build_item_card_lines(
    name: &str,
    nickname: Option<&str>,
    inner_width: u16,
    inner_height: u16,
    selected: bool,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let mut lines = Vec::with_capacity(height);
    let content_rows = if nickname.is_some() { 2 } else { 1 };
    let top_padding = height.saturating_sub(content_rows) / 2;
    for _ in 0..top_padding {
        lines.push(Line::from(""));
    }

    let label = centered_label(&display_name(name), width);
    let name_style = if selected {
        Style::default()
            .fg(palette.selected)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(label, name_style)));

    if let Some(nickname) = nickname {
        if lines.len() < height {
            lines.push(Line::from(Span::styled(
                centered_label(&format!("★ {nickname}"), width),
                Style::default().fg(palette.info),
            )));
        }
    }

    lines.truncate(height);
    lines
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
