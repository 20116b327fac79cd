use crate::capture::matches_name;
use crate::models::{CaptureRecord, CatalogItem};

use super::nav::NavBar;

/// Number of item cards shown in each row of the catalog grid.
pub(crate) const GRID_COLUMNS: usize = 4;

/// Selection and filter state of the catalog grid. The items themselves live
/// in the paginator; this screen only indexes into them.
#[derive(Default)]
pub(crate) struct CatalogScreen {
    pub(crate) nav: NavBar,
    pub(crate) query: String,
    /// Position within the filtered view.
    pub(crate) selected: usize,
}

impl CatalogScreen {
    /// Indices into `items` that pass the current name filter.
    pub(crate) fn visible(&self, items: &[CatalogItem]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_name(&item.name, &self.query))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub(crate) fn current<'a>(&self, items: &'a [CatalogItem]) -> Option<&'a CatalogItem> {
        self.visible(items)
            .get(self.selected)
            .and_then(|&idx| items.get(idx))
    }

    pub(crate) fn set_query(&mut self, query: String, items: &[CatalogItem]) {
        self.query = query;
        self.ensure_in_bounds(self.visible(items).len());
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = len as isize - 1;
        let new = (self.selected as isize + offset).clamp(0, max);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Whether the selection sits in the last grid row, i.e. the view is
    /// scrolled to the bottom.
    pub(crate) fn at_bottom(&self, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let last_row = (len - 1) / GRID_COLUMNS;
        self.selected / GRID_COLUMNS >= last_row
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Captures rebuilt from storage when the screen is entered.
pub(crate) struct CapturedScreen {
    pub(crate) nav: NavBar,
    pub(crate) records: Vec<CaptureRecord>,
    pub(crate) filtered: Vec<CaptureRecord>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl CapturedScreen {
    pub(crate) fn new(records: Vec<CaptureRecord>) -> Self {
        let mut screen = Self {
            nav: NavBar::default(),
            filtered: Vec::new(),
            records,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        let query = self.filter.as_deref().unwrap_or("");
        self.filtered = self
            .records
            .iter()
            .filter(|record| matches_name(&record.name, query))
            .cloned()
            .collect();

        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    pub(crate) fn current(&self) -> Option<&CaptureRecord> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let max = self.filtered.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }
}
