use ratatui::style::Color;

/// Colors for one rendering mode. The light palette leaves the terminal
/// background alone; the dark one paints its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) background: Color,
    pub(crate) text: Color,
    pub(crate) muted: Color,
    pub(crate) border: Color,
    pub(crate) selected: Color,
    pub(crate) nav_bg: Color,
    pub(crate) nav_active: Color,
    pub(crate) key: Color,
    pub(crate) info: Color,
    pub(crate) error: Color,
    pub(crate) link: Color,
}

impl Palette {
    pub(crate) fn light() -> Self {
        Self {
            background: Color::Reset,
            text: Color::Reset,
            muted: Color::Gray,
            border: Color::Reset,
            selected: Color::Yellow,
            nav_bg: Color::Blue,
            nav_active: Color::White,
            key: Color::Cyan,
            info: Color::Green,
            error: Color::Red,
            link: Color::Cyan,
        }
    }

    pub(crate) fn dark() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),
            text: Color::Rgb(205, 214, 244),
            muted: Color::Rgb(166, 173, 200),
            border: Color::Rgb(69, 71, 90),
            selected: Color::Rgb(249, 226, 175),
            nav_bg: Color::Rgb(24, 24, 36),
            nav_active: Color::Rgb(137, 180, 250),
            key: Color::Rgb(137, 180, 250),
            info: Color::Rgb(166, 227, 161),
            error: Color::Rgb(243, 139, 168),
            link: Color::Rgb(137, 220, 235),
        }
    }

    pub(crate) fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }
}
