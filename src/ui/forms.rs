use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::theme::Palette;
use crate::capture::CaptureDraft;

pub(crate) const NICKNAME_PREFIX: &str = "Nickname: ";

/// Modal state while the capture dialog is open.
#[derive(Clone)]
pub(crate) struct CaptureForm {
    pub(crate) draft: CaptureDraft,
    pub(crate) error: Option<String>,
}

impl CaptureForm {
    pub(crate) fn new(draft: CaptureDraft) -> Self {
        Self { draft, error: None }
    }

    /// Append a character to the nickname, rejecting control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.draft.nickname.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.draft.nickname.pop();
    }

    /// Render the nickname input line.
    pub(crate) fn build_nickname_line(&self, palette: &Palette) -> Line<'static> {
        let nickname = &self.draft.nickname;
        let (display, style) = if nickname.is_empty() {
            ("<required>".to_string(), Style::default().fg(palette.muted))
        } else {
            (nickname.clone(), Style::default().fg(palette.selected))
        };

        Line::from(vec![
            Span::raw(NICKNAME_PREFIX),
            Span::styled(display, style),
        ])
    }

    /// Character count of the nickname, for cursor placement.
    pub(crate) fn value_len(&self) -> usize {
        self.draft.nickname.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CaptureForm {
        CaptureForm::new(CaptureDraft {
            name: "pikachu".into(),
            image_url: "https://img/25.png".into(),
            nickname: String::new(),
            capture_time: "now".into(),
            previously_captured: false,
        })
    }

    #[test]
    fn typing_edits_the_nickname() {
        let mut form = form();
        assert!(form.push_char('S'));
        assert!(form.push_char('p'));
        assert!(!form.push_char('\u{7}'));
        form.backspace();
        assert_eq!(form.draft.nickname, "S");
        assert_eq!(form.value_len(), 1);
    }

    #[test]
    fn empty_nickname_renders_placeholder() {
        let line = form().build_nickname_line(&Palette::light());
        assert_eq!(line.to_string(), "Nickname: <required>");
    }
}
