//! Incremental pagination of the remote index merged into a de-duplicated
//! session list.
//!
//! The [`Paginator`] owns the cursor, the "seen" set and the loading guard. It
//! never performs I/O itself: callers ask it for the next [`PageRequest`], run
//! [`fetch_page`] wherever they like (the TUI uses a background thread), and
//! hand the result back through [`Paginator::finish`].

use std::collections::HashSet;
use std::thread;

use tracing::{debug, info, warn};

use crate::api::{ApiError, CatalogSource};
use crate::models::CatalogItem;

/// Pagination position. `Exhausted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Offset(u32),
    Exhausted,
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

/// What happened when a page result was handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page merged; more pages may follow.
    Merged { added: usize },
    /// Page merged and pagination stopped for good.
    Exhausted { added: usize },
    /// Page dropped; the cursor stayed where it was.
    Failed { message: String },
}

#[derive(Debug)]
pub struct Paginator {
    limit: u32,
    /// Item-count ceiling; `0` disables it.
    ceiling: usize,
    cursor: Cursor,
    loading: bool,
    items: Vec<CatalogItem>,
    seen: HashSet<String>,
}

impl Paginator {
    pub fn new(limit: u32, ceiling: usize) -> Self {
        Self {
            limit: limit.max(1),
            ceiling,
            cursor: Cursor::Offset(0),
            loading: false,
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Exhausted
    }

    /// Claim the next page. Returns `None` while a fetch is outstanding or
    /// once pagination is exhausted; otherwise marks the paginator as loading.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if self.loading {
            return None;
        }
        let Cursor::Offset(offset) = self.cursor else {
            return None;
        };
        self.loading = true;
        let request = PageRequest {
            limit: self.limit,
            offset,
        };
        debug!(?request, "page fetch started");
        Some(request)
    }

    /// Release the loading guard and fold a page result into the session.
    pub fn finish(
        &mut self,
        request: PageRequest,
        result: Result<Vec<CatalogItem>, ApiError>,
    ) -> PageOutcome {
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(offset = request.offset, error = %err, "page fetch failed; page dropped");
                return PageOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };

        let received = page.len();
        let added = merge_unique(&mut self.items, &mut self.seen, page);
        let ceiling_reached = self.ceiling > 0 && self.items.len() >= self.ceiling;

        if received == 0 || ceiling_reached {
            self.cursor = Cursor::Exhausted;
            info!(
                offset = request.offset,
                added,
                total = self.items.len(),
                "pagination exhausted"
            );
            PageOutcome::Exhausted { added }
        } else {
            self.cursor = Cursor::Offset(request.offset.saturating_add(request.limit));
            info!(offset = request.offset, added, total = self.items.len(), "page merged");
            PageOutcome::Merged { added }
        }
    }
}

/// Append the items of `page` whose names are not in `seen`, recording them.
/// Returns how many were appended.
pub fn merge_unique(
    items: &mut Vec<CatalogItem>,
    seen: &mut HashSet<String>,
    page: Vec<CatalogItem>,
) -> usize {
    let before = items.len();
    items.extend(page.into_iter().filter(|item| seen.insert(item.name.clone())));
    items.len() - before
}

/// Fetch one page of references and resolve every entry. Detail lookups run
/// concurrently and are joined before returning; the result keeps index order.
/// Any failed lookup fails the whole page, including a lookup thread that
/// could not be started.
pub fn fetch_page(
    source: &dyn CatalogSource,
    request: PageRequest,
) -> Result<Vec<CatalogItem>, ApiError> {
    let refs = source.list_page(request.limit, request.offset)?;

    thread::scope(|scope| -> Result<Vec<CatalogItem>, ApiError> {
        let mut handles = Vec::with_capacity(refs.len());
        for item_ref in &refs {
            let handle = thread::Builder::new()
                .spawn_scoped(scope, move || source.resolve(item_ref))
                .map_err(ApiError::Spawn)?;
            handles.push((item_ref, handle));
        }

        handles
            .into_iter()
            .map(|(item_ref, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(ApiError::WorkerPanicked {
                        name: item_ref.name.clone(),
                    })
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> CatalogItem {
        CatalogItem::new(name, format!("https://img/{name}.png"))
    }

    #[test]
    fn begin_is_guarded_while_loading() {
        let mut paginator = Paginator::new(20, 150);
        let first = paginator.begin();
        assert_eq!(first, Some(PageRequest { limit: 20, offset: 0 }));
        assert!(paginator.is_loading());
        assert_eq!(paginator.begin(), None);
    }

    #[test]
    fn merge_skips_duplicates_inside_one_page() {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let added = merge_unique(
            &mut items,
            &mut seen,
            vec![item("mew"), item("mew"), item("ditto")],
        );
        assert_eq!(added, 2);
        assert_eq!(items, vec![item("mew"), item("ditto")]);
    }

    #[test]
    fn zero_ceiling_only_stops_on_empty_page() {
        let mut paginator = Paginator::new(2, 0);
        let request = paginator.begin().unwrap();
        let outcome = paginator.finish(request, Ok(vec![item("a"), item("b")]));
        assert_eq!(outcome, PageOutcome::Merged { added: 2 });
        assert_eq!(paginator.cursor(), Cursor::Offset(2));

        let request = paginator.begin().unwrap();
        let outcome = paginator.finish(request, Ok(Vec::new()));
        assert_eq!(outcome, PageOutcome::Exhausted { added: 0 });
        assert!(paginator.is_exhausted());
        assert_eq!(paginator.begin(), None);
    }

    #[test]
    fn failure_releases_guard_without_advancing() {
        let mut paginator = Paginator::new(20, 150);
        let request = paginator.begin().unwrap();
        let outcome = paginator.finish(request, Err(ApiError::Other("offline".into())));
        assert!(matches!(outcome, PageOutcome::Failed { .. }));
        assert!(!paginator.is_loading());
        assert_eq!(paginator.cursor(), Cursor::Offset(0));
        assert_eq!(paginator.begin(), Some(request));
    }
}
