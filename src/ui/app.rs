use std::cmp::min;
use std::collections::HashMap;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::api::{ApiError, CatalogSource};
use crate::capture::{load_captures, local_timestamp, CaptureDraft};
use crate::catalog::{fetch_page, PageOutcome, PageRequest, Paginator};
use crate::config::Settings;
use crate::db::KeyValueStore;
use crate::models::{display_name, CaptureRecord, CatalogItem};

use super::forms::{CaptureForm, NICKNAME_PREFIX};
use super::helpers::{build_item_card_lines, centered_rect, surface_error};
use super::nav::{draw_nav, NavBar, Tab};
use super::screens::{CapturedScreen, CatalogScreen, GRID_COLUMNS};
use super::theme::Palette;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const NAV_HEIGHT: u16 = 3;
const SEARCH_HEIGHT: u16 = 3;
/// Height of one catalog card.
const ITEM_CARD_HEIGHT: u16 = 5;
/// Height allocation per capture card in the captured list.
const CAPTURE_CARD_HEIGHT: u16 = 5;
/// Width of the "captured this session" side panel.
const SESSION_PANEL_WIDTH: u16 = 34;
const SEARCH_PREFIX: &str = "Search Pokemon: ";
/// Row of the nickname field inside the capture dialog.
const NICKNAME_ROW: u16 = 3;

/// The two top-level screens.
enum Screen {
    Catalog(CatalogScreen),
    Captured(CapturedScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Capturing(CaptureForm),
    Searching(SearchState),
}

/// State for an active inline search. The query is mirrored into the current
/// screen's filter on every edit.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self, palette: &Palette) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(palette.info),
            StatusKind::Error => Style::default().fg(palette.error),
        }
    }
}

/// A finished page fetch travelling back from the worker thread.
struct FetchResponse {
    request: PageRequest,
    result: Result<Vec<CatalogItem>, ApiError>,
}

/// Central application state shared across the TUI.
pub struct App {
    store: Box<dyn KeyValueStore>,
    source: Arc<dyn CatalogSource>,
    time_format: String,
    paginator: Paginator,
    /// Captures confirmed since start-up, in confirmation order.
    session_captures: Vec<CaptureRecord>,
    /// Nicknames of persisted captures keyed by item name, for card badges.
    nicknames: HashMap<String, String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    fetch_tx: Sender<FetchResponse>,
    fetch_rx: Receiver<FetchResponse>,
}

impl App {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        source: Arc<dyn CatalogSource>,
        settings: &Settings,
    ) -> Self {
        let (fetch_tx, fetch_rx) = unbounded();
        let mut app = Self {
            store,
            source,
            time_format: settings.ui.time_format.clone(),
            paginator: Paginator::new(settings.catalog.page_size, settings.catalog.item_ceiling),
            session_captures: Vec::new(),
            nicknames: HashMap::new(),
            screen: Screen::Catalog(CatalogScreen::default()),
            mode: Mode::Normal,
            status: None,
            fetch_tx,
            fetch_rx,
        };
        app.reload_nicknames();
        app
    }

    /// Kick off the first page fetch.
    pub fn start(&mut self) {
        self.request_next_page();
    }

    /// Start a background fetch for the next page. Does nothing while one is
    /// in flight or once pagination is exhausted.
    ///
    /// Every started request is answered exactly once, even when the worker
    /// panics or cannot be spawned, so the loading guard is always released.
    pub(crate) fn request_next_page(&mut self) -> bool {
        let Some(request) = self.paginator.begin() else {
            return false;
        };
        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let spawned = thread::Builder::new()
            .name("page-fetch".into())
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| fetch_page(source.as_ref(), request)))
                    .unwrap_or_else(|_| {
                        Err(ApiError::PagePanicked {
                            offset: request.offset,
                        })
                    });
                let _ = tx.send(FetchResponse { request, result });
            });

        if let Err(err) = spawned {
            warn!(offset = request.offset, error = %err, "failed to spawn page fetch");
            self.apply_fetch(FetchResponse {
                request,
                result: Err(ApiError::Spawn(err)),
            });
        }
        true
    }

    /// Fold every finished fetch into the session. Called once per loop tick.
    pub(crate) fn poll_fetches(&mut self) {
        while let Ok(response) = self.fetch_rx.try_recv() {
            self.apply_fetch(response);
        }
    }

    fn apply_fetch(&mut self, response: FetchResponse) {
        match self.paginator.finish(response.request, response.result) {
            PageOutcome::Failed { message } => {
                self.set_status(
                    format!("Could not load Pokémon ({message}). Scroll down to retry."),
                    StatusKind::Error,
                );
            }
            PageOutcome::Merged { .. } | PageOutcome::Exhausted { .. } => {
                if matches!(self.status, Some(StatusMessage { kind: StatusKind::Error, .. })) {
                    self.clear_status();
                }
            }
        }
        if let Screen::Catalog(catalog) = &mut self.screen {
            let len = catalog.visible(self.paginator.items()).len();
            catalog.ensure_in_bounds(len);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Capturing(form) => self.handle_capture(code, form)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Catalog(ref mut catalog) => {
                let len = catalog.visible(self.paginator.items()).len();
                let mut moved = false;
                let mut open_capture = false;
                let mut open_image = false;
                let mut switch_to_captured = false;

                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Left => {
                        catalog.move_selection(-1, len);
                        moved = true;
                    }
                    KeyCode::Right => {
                        catalog.move_selection(1, len);
                        moved = true;
                    }
                    KeyCode::Up => {
                        catalog.move_selection(-(GRID_COLUMNS as isize), len);
                        moved = true;
                    }
                    KeyCode::Down => {
                        catalog.move_selection(GRID_COLUMNS as isize, len);
                        moved = true;
                    }
                    KeyCode::PageUp => {
                        catalog.move_selection(-(GRID_COLUMNS as isize) * 3, len);
                        moved = true;
                    }
                    KeyCode::PageDown => {
                        catalog.move_selection(GRID_COLUMNS as isize * 3, len);
                        moved = true;
                    }
                    KeyCode::Home => {
                        catalog.select_first();
                        moved = true;
                    }
                    KeyCode::End => {
                        catalog.select_last(len);
                        moved = true;
                    }
                    KeyCode::Enter => open_capture = true,
                    KeyCode::Char('o') => open_image = true,
                    KeyCode::Tab | KeyCode::Char('c') => switch_to_captured = true,
                    KeyCode::Char('d') => {
                        catalog.nav.toggle_dark_mode();
                    }
                    KeyCode::Char('f') => {
                        let open = catalog.nav.toggle_search();
                        catalog.set_query(String::new(), self.paginator.items());
                        if open {
                            return Ok(Mode::Searching(SearchState {
                                query: String::new(),
                            }));
                        }
                    }
                    KeyCode::Char('/') => {
                        catalog.nav.search_open = true;
                        return Ok(Mode::Searching(SearchState {
                            query: catalog.query.clone(),
                        }));
                    }
                    _ => {}
                }

                let selected = catalog.current(self.paginator.items()).cloned();
                let at_bottom = catalog.at_bottom(len);

                if moved && at_bottom {
                    self.request_next_page();
                }

                if switch_to_captured {
                    self.clear_status();
                    self.open_captured_screen();
                } else if open_capture {
                    return Ok(self.open_capture_dialog(selected));
                } else if open_image {
                    if let Some(item) = selected {
                        self.open_image(&item.name, &item.image_url);
                    }
                }

                Ok(Mode::Normal)
            }
            Screen::Captured(ref mut captured) => {
                let mut open_image = None;
                let mut back_to_catalog = false;

                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Tab | KeyCode::Char('c') => back_to_catalog = true,
                    KeyCode::Up => captured.move_selection(-1),
                    KeyCode::Down => captured.move_selection(1),
                    KeyCode::PageUp => captured.move_selection(-5),
                    KeyCode::PageDown => captured.move_selection(5),
                    KeyCode::Home => captured.select_first(),
                    KeyCode::End => captured.select_last(),
                    KeyCode::Enter | KeyCode::Char('o') => {
                        open_image = captured
                            .current()
                            .map(|record| (record.name.clone(), record.image_url.clone()));
                    }
                    KeyCode::Char('d') => {
                        captured.nav.toggle_dark_mode();
                    }
                    KeyCode::Char('f') => {
                        let open = captured.nav.toggle_search();
                        captured.set_filter(None);
                        if open {
                            return Ok(Mode::Searching(SearchState {
                                query: String::new(),
                            }));
                        }
                    }
                    KeyCode::Char('/') => {
                        captured.nav.search_open = true;
                        return Ok(Mode::Searching(SearchState {
                            query: captured.filter.clone().unwrap_or_default(),
                        }));
                    }
                    _ => {}
                }

                if back_to_catalog {
                    self.clear_status();
                    self.screen = Screen::Catalog(CatalogScreen::default());
                } else if let Some((name, url)) = open_image {
                    self.open_image(&name, &url);
                }

                Ok(Mode::Normal)
            }
        }
    }

    fn handle_capture(&mut self, code: KeyCode, mut form: CaptureForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Capture cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => {
                let now = local_timestamp(&self.time_format);
                match form.draft.confirm(self.store.as_ref(), &now) {
                    Ok(Some(record)) => {
                        self.set_status(
                            format!(
                                "Captured {} as {}.",
                                display_name(&record.name),
                                record.nickname
                            ),
                            StatusKind::Info,
                        );
                        self.nicknames
                            .insert(record.name.clone(), record.nickname.clone());
                        self.session_captures.push(record);
                        keep_open = false;
                    }
                    Ok(None) => {
                        form.error = Some("Nickname is required.".to_string());
                    }
                    Err(err) => {
                        let message = surface_error(&anyhow::Error::new(err));
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Capturing(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        let items = self.paginator.items();
        let mut moved_to_bottom = false;

        let keep_searching = match &mut self.screen {
            Screen::Catalog(catalog) => {
                let len = catalog.visible(items).len();
                match code {
                    KeyCode::Esc => {
                        catalog.nav.search_open = false;
                        state.query.clear();
                        false
                    }
                    KeyCode::Enter => false,
                    KeyCode::Up => {
                        catalog.move_selection(-(GRID_COLUMNS as isize), len);
                        true
                    }
                    KeyCode::Down => {
                        catalog.move_selection(GRID_COLUMNS as isize, len);
                        moved_to_bottom = catalog.at_bottom(len);
                        true
                    }
                    KeyCode::Backspace => {
                        state.query.pop();
                        true
                    }
                    KeyCode::Char(ch) if !ch.is_control() => {
                        state.query.push(ch);
                        true
                    }
                    _ => true,
                }
            }
            Screen::Captured(captured) => match code {
                KeyCode::Esc => {
                    captured.nav.search_open = false;
                    state.query.clear();
                    false
                }
                KeyCode::Enter => false,
                KeyCode::Up => {
                    captured.move_selection(-1);
                    true
                }
                KeyCode::Down => {
                    captured.move_selection(1);
                    true
                }
                KeyCode::Backspace => {
                    state.query.pop();
                    true
                }
                KeyCode::Char(ch) if !ch.is_control() => {
                    state.query.push(ch);
                    true
                }
                _ => true,
            },
        };

        match &mut self.screen {
            Screen::Catalog(catalog) => {
                if catalog.query != state.query {
                    catalog.set_query(state.query.clone(), self.paginator.items());
                }
            }
            Screen::Captured(captured) => {
                let filter = if state.query.is_empty() {
                    None
                } else {
                    Some(state.query.clone())
                };
                if captured.filter != filter {
                    captured.set_filter(filter);
                }
            }
        }

        if moved_to_bottom {
            self.request_next_page();
        }

        if keep_searching {
            Ok(Mode::Searching(state))
        } else {
            Ok(Mode::Normal)
        }
    }

    /// Ctrl+O: open the image of whatever is focused, including the item shown
    /// in the capture dialog.
    pub(crate) fn handle_ctrl_o(&mut self) {
        let target = match (&self.mode, &self.screen) {
            (Mode::Capturing(form), _) => {
                Some((form.draft.name.clone(), form.draft.image_url.clone()))
            }
            (_, Screen::Catalog(catalog)) => catalog
                .current(self.paginator.items())
                .map(|item| (item.name.clone(), item.image_url.clone())),
            (_, Screen::Captured(captured)) => captured
                .current()
                .map(|record| (record.name.clone(), record.image_url.clone())),
        };
        if let Some((name, url)) = target {
            self.open_image(&name, &url);
        }
    }

    fn open_capture_dialog(&mut self, item: Option<CatalogItem>) -> Mode {
        let Some(item) = item else {
            self.set_status("No Pokémon selected.", StatusKind::Error);
            return Mode::Normal;
        };
        self.clear_status();
        let now = local_timestamp(&self.time_format);
        Mode::Capturing(CaptureForm::new(CaptureDraft::open(
            self.store.as_ref(),
            &item,
            &now,
        )))
    }

    /// Enter the captured screen, rebuilding its list from storage.
    fn open_captured_screen(&mut self) {
        let records = match load_captures(self.store.as_ref()) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "failed to enumerate captures");
                self.set_status(
                    format!("Could not read captures: {err}"),
                    StatusKind::Error,
                );
                Vec::new()
            }
        };
        self.nicknames = records
            .iter()
            .map(|record| (record.name.clone(), record.nickname.clone()))
            .collect();
        self.screen = Screen::Captured(CapturedScreen::new(records));
    }

    fn reload_nicknames(&mut self) {
        match load_captures(self.store.as_ref()) {
            Ok(records) => {
                self.nicknames = records
                    .into_iter()
                    .map(|record| (record.name, record.nickname))
                    .collect();
            }
            Err(err) => warn!(error = %err, "failed to enumerate captures"),
        }
    }

    fn open_image(&mut self, name: &str, url: &str) {
        let label = display_name(name);
        if url.trim().is_empty() {
            warn!(item = %name, "no image url");
            self.set_status(format!("{label} has no image."), StatusKind::Error);
        } else if let Err(err) = open_link(url) {
            warn!(item = %name, %url, error = %err, "failed to open image");
            self.set_status(
                format!("Failed to open image for {label}: {err}"),
                StatusKind::Error,
            );
        } else {
            self.set_status(format!("Opened image for {label}."), StatusKind::Info);
        }
    }

    fn nav(&self) -> (&NavBar, Tab) {
        match &self.screen {
            Screen::Catalog(catalog) => (&catalog.nav, Tab::Catalog),
            Screen::Captured(captured) => (&captured.nav, Tab::Captured),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let (nav, tab) = self.nav();
        let palette = nav.palette();

        frame.render_widget(
            Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
            area,
        );

        let search_height = if nav.search_open { SEARCH_HEIGHT } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NAV_HEIGHT),
                Constraint::Length(search_height),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        draw_nav(frame, chunks[0], tab, nav);

        if nav.search_open {
            self.draw_search_bar(frame, chunks[1], &palette);
        }

        match &self.screen {
            Screen::Catalog(catalog) => self.draw_catalog(frame, chunks[2], catalog, &palette),
            Screen::Captured(captured) => self.draw_captured(frame, chunks[2], captured, &palette),
        }

        self.draw_footer(frame, chunks[3], &palette);

        if let Mode::Capturing(form) = &self.mode {
            self.draw_capture_form(frame, area, form, &palette);
        }
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect, catalog: &CatalogScreen, palette: &Palette) {
        let (grid_area, panel_area) = if self.session_captures.is_empty() {
            (area, None)
        } else {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(SESSION_PANEL_WIDTH)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        };

        let items = self.paginator.items();
        let progress = if self.paginator.is_loading() {
            "loading Pokemon...".to_string()
        } else if self.paginator.is_exhausted() {
            "end of list".to_string()
        } else {
            "scroll down for more".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(format!(" All Pokemon ({} loaded, {progress}) ", items.len()));
        let inner = block.inner(grid_area);
        frame.render_widget(block, grid_area);

        let visible = catalog.visible(items);
        if visible.is_empty() {
            let text = if items.is_empty() && self.paginator.is_loading() {
                "Loading Pokemon..."
            } else if items.is_empty() {
                "No Pokémon loaded yet."
            } else {
                "No Pokémon match the current search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted));
            frame.render_widget(message, inner);
        } else {
            self.render_item_grid(frame, inner, items, &visible, catalog.selected, palette);
        }

        if let Some(panel_area) = panel_area {
            self.draw_session_panel(frame, panel_area, palette);
        }
    }

    fn render_item_grid(
        &self,
        frame: &mut Frame,
        area: Rect,
        items: &[CatalogItem],
        visible: &[usize],
        selected: usize,
        palette: &Palette,
    ) {
        if area.height == 0 {
            return;
        }
        let capacity = ((area.height / ITEM_CARD_HEIGHT) as usize).max(1);
        let total_rows = (visible.len() + GRID_COLUMNS - 1) / GRID_COLUMNS;
        let selected_row = selected / GRID_COLUMNS;
        let start_row = (selected_row + 1).saturating_sub(capacity);
        let end_row = min(start_row + capacity, total_rows);

        let row_constraints: Vec<Constraint> = (start_row..end_row)
            .map(|_| Constraint::Length(ITEM_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        let percent = (100 / GRID_COLUMNS as u16).max(1);
        for (row_offset, row_chunk) in rows.iter().enumerate() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Percentage(percent); GRID_COLUMNS])
                .split(*row_chunk);

            for (col_idx, column_chunk) in columns.iter().enumerate() {
                let position = (start_row + row_offset) * GRID_COLUMNS + col_idx;
                let Some(item) = visible.get(position).and_then(|&idx| items.get(idx)) else {
                    continue;
                };
                let is_selected = position == selected;
                let border_style = if is_selected {
                    Style::default().fg(palette.selected)
                } else {
                    Style::default().fg(palette.border)
                };
                let block = Block::default().borders(Borders::ALL).border_style(border_style);
                let lines = build_item_card_lines(
                    &item.name,
                    self.nicknames.get(&item.name).map(String::as_str),
                    column_chunk.width.saturating_sub(2),
                    column_chunk.height.saturating_sub(2),
                    is_selected,
                    palette,
                );
                frame.render_widget(Paragraph::new(lines).block(block), *column_chunk);
            }
        }
    }

    fn draw_session_panel(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let mut lines = Vec::with_capacity(self.session_captures.len() * 2);
        for record in &self.session_captures {
            lines.push(Line::from(vec![
                Span::styled(
                    display_name(&record.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" - "),
                Span::raw(record.nickname.clone()),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  (Captured at {})", record.capture_time),
                Style::default().fg(palette.muted),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.border))
                    .title(" Pokémon Captured "),
            );
        frame.render_widget(paragraph, area);
    }

    fn draw_captured(
        &self,
        frame: &mut Frame,
        area: Rect,
        captured: &CapturedScreen,
        palette: &Palette,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Captured Pokemon ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = if captured.records.is_empty() {
            Some("No Pokémon captured yet.")
        } else if captured.filtered.is_empty() {
            Some("No Pokémon match the current search.")
        } else {
            None
        };

        match text {
            Some(text) => {
                let message = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(palette.muted));
                frame.render_widget(message, inner);
            }
            None => {
                self.render_capture_cards(frame, inner, &captured.filtered, captured.selected, palette)
            }
        }
    }

    fn render_capture_cards(
        &self,
        frame: &mut Frame,
        area: Rect,
        records: &[CaptureRecord],
        selected: usize,
        palette: &Palette,
    ) {
        if records.is_empty() || area.height == 0 {
            return;
        }

        let card_height = CAPTURE_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = records.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(CAPTURE_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            let record_index = start + idx;
            let Some(record) = records.get(record_index) else {
                break;
            };

            let is_selected = record_index == selected;
            let border_style = if is_selected {
                Style::default().fg(palette.selected)
            } else {
                Style::default().fg(palette.border)
            };

            let title = if is_selected {
                format!("▶ {}", display_name(&record.name))
            } else {
                display_name(&record.name)
            };
            let mut lines = vec![
                Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
                Line::from(format!("Nickname: {}", record.nickname)),
            ];
            if !record.capture_time.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("Captured at: {}", record.capture_time),
                    Style::default().fg(palette.muted),
                )));
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title_bottom(Span::styled(
                    record.image_url.clone(),
                    Style::default().fg(palette.link),
                ));
            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let (query, focused) = match (&self.mode, &self.screen) {
            (Mode::Searching(state), _) => (state.query.clone(), true),
            (_, Screen::Catalog(catalog)) => (catalog.query.clone(), false),
            (_, Screen::Captured(captured)) => (captured.filter.clone().unwrap_or_default(), false),
        };

        let border_style = if focused {
            Style::default().fg(palette.selected)
        } else {
            Style::default().fg(palette.border)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search ");
        let paragraph = Paragraph::new(Span::raw(format!("{SEARCH_PREFIX}{query}")))
            .block(block.clone());
        frame.render_widget(paragraph, area);

        if focused {
            let inner = block.inner(area);
            let cursor_x = inner.x + SEARCH_PREFIX.chars().count() as u16 + query.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(
                status.text.clone(),
                status.kind.style(palette),
            )])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions(palette);

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = Style::default().fg(palette.key).add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Capturing(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Tag as Captured   "),
                Span::styled("[Ctrl+O]", key_style),
                Span::raw(" Open Image   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[Type]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Done   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            (Screen::Captured(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open Image   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[d]", key_style),
                Span::raw(" Dark Mode   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Pokemon List   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Catalog(_), _) => Line::from(vec![
                Span::styled("[←↑↓→]", key_style),
                Span::raw(" Move   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Capture   "),
                Span::styled("[o]", key_style),
                Span::raw(" Open Image   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[d]", key_style),
                Span::raw(" Dark Mode   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Captured   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_capture_form(&self, frame: &mut Frame, area: Rect, form: &CaptureForm, palette: &Palette) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let name = display_name(&form.draft.name);
        let block = Block::default()
            .title(format!(" {name} "))
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.background).fg(palette.text));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        // One row per field, clipped rather than wrapped, so the nickname
        // always sits on `NICKNAME_ROW`.
        let fields = vec![
            Line::from(Span::styled(
                format!("Details about {name}"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                form.draft.image_url.clone(),
                Style::default().fg(palette.link),
            )),
            Line::from(""),
            form.build_nickname_line(palette),
            Line::from(format!("Captured at: {}", form.draft.capture_time)),
        ];
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(fields.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);
        frame.render_widget(Paragraph::new(fields), sections[0]);

        let hint_line = if let Some(error) = &form.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(palette.error)))
        } else {
            let hint = if form.draft.previously_captured {
                "Already captured • Enter to re-tag • Esc to close"
            } else {
                "Enter to tag as captured • Esc to close"
            };
            Line::from(Span::styled(hint, Style::default().fg(palette.muted)))
        };
        frame.render_widget(
            Paragraph::new(hint_line).wrap(Wrap { trim: true }),
            sections[1],
        );

        let cursor_x = inner.x + NICKNAME_PREFIX.len() as u16 + form.value_len() as u16;
        frame.set_cursor_position((cursor_x, inner.y + NICKNAME_ROW));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::capture::read_capture;
    use crate::db::MemoryStore;
    use crate::models::ItemRef;

    /// Serves `total` numbered items and counts list calls. `failing` makes
    /// every list call error; `panicking` makes the next one panic.
    struct NumberedSource {
        total: u32,
        list_calls: AtomicUsize,
        failing: AtomicBool,
        panicking: AtomicBool,
    }

    impl CatalogSource for NumberedSource {
        fn list_page(&self, limit: u32, offset: u32) -> Result<Vec<ItemRef>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.panicking.swap(false, Ordering::SeqCst) {
                panic!("list page {offset} blew up");
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(ApiError::Other(format!("offset {offset} unavailable")));
            }
            Ok((offset..min(offset + limit, self.total))
                .map(|n| ItemRef {
                    name: format!("mon{n}"),
                    url: format!("https://api/{n}"),
                })
                .collect())
        }

        fn resolve(&self, item: &ItemRef) -> Result<CatalogItem, ApiError> {
            Ok(CatalogItem::new(item.name.clone(), format!("{}.png", item.url)))
        }
    }

    impl App {
        fn wait_for_fetch(&mut self) {
            let response = self
                .fetch_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("fetch did not finish");
            self.apply_fetch(response);
        }
    }

    fn app_with(total: u32, page_size: u32, ceiling: usize) -> (App, Arc<NumberedSource>) {
        let source = Arc::new(NumberedSource {
            total,
            list_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            panicking: AtomicBool::new(false),
        });
        let mut settings = Settings::default();
        settings.catalog.page_size = page_size;
        settings.catalog.item_ceiling = ceiling;
        let app = App::new(Box::new(MemoryStore::new()), source.clone(), &settings);
        (app, source)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn scrolling_to_bottom_loads_until_ceiling() {
        let (mut app, source) = app_with(100, 4, 8);
        app.start();
        app.wait_for_fetch();
        assert_eq!(app.paginator.items().len(), 4);

        app.handle_key(KeyCode::Down).unwrap();
        app.wait_for_fetch();
        assert_eq!(app.paginator.items().len(), 8);
        assert!(app.paginator.is_exhausted());

        for _ in 0..5 {
            app.handle_key(KeyCode::Down).unwrap();
            app.handle_key(KeyCode::End).unwrap();
        }
        app.poll_fetches();
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn capture_dialog_persists_and_lists_session_capture() {
        let (mut app, _) = app_with(4, 4, 150);
        app.start();
        app.wait_for_fetch();

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Capturing(_)));
        type_text(&mut app, "Sparky");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.session_captures.len(), 1);
        let stored = read_capture(app.store.as_ref(), "mon0").unwrap().unwrap();
        assert_eq!(stored.nickname, "Sparky");
        assert_eq!(app.nicknames.get("mon0").map(String::as_str), Some("Sparky"));
    }

    #[test]
    fn blank_nickname_keeps_dialog_open_without_writing() {
        let (mut app, _) = app_with(4, 4, 150);
        app.start();
        app.wait_for_fetch();

        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "   ");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::Capturing(form) => assert!(form.error.is_some()),
            _ => panic!("dialog should stay open"),
        }
        assert!(app.store.list_keys().unwrap().is_empty());

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.session_captures.is_empty());
    }

    #[test]
    fn captured_screen_rebuilds_from_store_and_filters() {
        let (mut app, _) = app_with(4, 4, 150);
        app.start();
        app.wait_for_fetch();
        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "Zero");
        app.handle_key(KeyCode::Enter).unwrap();
        app.store.set("debugger", "true").unwrap();

        app.handle_key(KeyCode::Tab).unwrap();
        let Screen::Captured(captured) = &app.screen else {
            panic!("expected captured screen");
        };
        assert_eq!(captured.records.len(), 1);
        assert!(!captured.nav.search_open);

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "MON");
        let Screen::Captured(captured) = &app.screen else {
            panic!("expected captured screen");
        };
        assert_eq!(captured.filtered.len(), 1);

        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        assert!(matches!(app.screen, Screen::Catalog(_)));
    }

    fn error_status(app: &App) -> Option<&str> {
        match &app.status {
            Some(StatusMessage {
                text,
                kind: StatusKind::Error,
            }) => Some(text.as_str()),
            _ => None,
        }
    }

    #[test]
    fn failed_page_shows_error_until_next_page_lands() {
        let (mut app, source) = app_with(8, 4, 0);
        source.failing.store(true, Ordering::SeqCst);
        app.start();
        app.wait_for_fetch();

        let status = error_status(&app).expect("error status after failed page");
        assert!(status.contains("offset 0 unavailable"));
        assert!(app.paginator.items().is_empty());
        assert!(!app.paginator.is_loading());

        source.failing.store(false, Ordering::SeqCst);
        app.handle_key(KeyCode::Down).unwrap();
        app.wait_for_fetch();

        assert!(app.status.is_none());
        assert_eq!(app.paginator.items().len(), 4);
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_fetch_releases_loading_guard() {
        let (mut app, source) = app_with(8, 4, 0);
        source.panicking.store(true, Ordering::SeqCst);
        app.start();
        app.wait_for_fetch();

        assert!(!app.paginator.is_loading());
        assert!(error_status(&app).is_some());

        app.handle_key(KeyCode::Down).unwrap();
        app.wait_for_fetch();
        assert_eq!(app.paginator.items().len(), 4);
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nickname_cursor_stays_on_field_with_long_image_url() {
        let (mut app, _) = app_with(4, 4, 0);
        app.start();
        app.wait_for_fetch();
        app.handle_key(KeyCode::Enter).unwrap();
        if let Mode::Capturing(form) = &mut app.mode {
            form.draft.image_url = format!("https://sprites.test/{}/25.png", "long".repeat(30));
        }
        type_text(&mut app, "Sp");

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, cursor.y)].symbol())
            .collect();
        assert!(row.contains("Nickname: Sp"), "cursor row was {row:?}");
        let byte_idx = row.find("Nickname: ").unwrap();
        let prefix_x = row[..byte_idx].chars().count() as u16;
        assert_eq!(cursor.x, prefix_x + "Nickname: Sp".len() as u16);
    }
}
