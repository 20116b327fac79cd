use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use super::theme::Palette;

pub(crate) const TAB_TITLES: [&str; 2] = ["Pokemon List", "Captured"];

/// Which tab of the navigation bar is current.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Catalog,
    Captured,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Catalog => 0,
            Tab::Captured => 1,
        }
    }
}

/// View flags owned by a single screen. They start cleared every time the
/// screen is entered and are never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct NavBar {
    pub(crate) dark_mode: bool,
    pub(crate) search_open: bool,
}

impl NavBar {
    pub(crate) fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Flip search visibility. Callers clear the query on every toggle.
    pub(crate) fn toggle_search(&mut self) -> bool {
        self.search_open = !self.search_open;
        self.search_open
    }

    pub(crate) fn palette(&self) -> Palette {
        Palette::for_mode(self.dark_mode)
    }
}

pub(crate) fn draw_nav(frame: &mut Frame, area: Rect, current: Tab, nav: &NavBar) {
    let palette = nav.palette();
    let mode_label = if nav.dark_mode { "Light Mode" } else { "Dark Mode" };
    let search_label = if nav.search_open { "Hide Search" } else { "Search" };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Pokédex ")
        .title_bottom(Line::from(vec![
            Span::styled("[f]", Style::default().fg(palette.key)),
            Span::raw(format!(" {search_label}  ")),
            Span::styled("[d]", Style::default().fg(palette.key)),
            Span::raw(format!(" {mode_label} ")),
        ]))
        .style(Style::default().bg(palette.nav_bg).fg(palette.text));

    let tabs = Tabs::new(TAB_TITLES.iter().map(|title| Line::from(*title)))
        .select(current.index())
        .block(block)
        .highlight_style(
            Style::default()
                .fg(palette.nav_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");

    frame.render_widget(tabs, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_cleared_and_toggle() {
        let mut nav = NavBar::default();
        assert!(!nav.dark_mode && !nav.search_open);
        assert!(nav.toggle_dark_mode());
        assert_eq!(nav.palette(), Palette::dark());
        assert!(nav.toggle_search());
        assert!(!nav.toggle_search());
    }
}
