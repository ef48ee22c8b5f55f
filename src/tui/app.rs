use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use crate::api::{Issue, Project};
use crate::config::Config;
use crate::keybindings::{Action, KeybindingMode, Keybindings};
use crate::highlight::SharedHighlighter;
use crate::query::{Page, QueryCache, QueryKey, build_query};
use crate::render::text::PlainLines;
use crate::table::{Column, PinSide, TableState};

use super::ui::detail::detail_lines;

/// How long a status message stays in the footer.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Width change per resize step, in the same units as column widths.
const RESIZE_STEP: u16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Detail,
    Search,
    Help,
}

/// Results coming back from background tasks.
#[derive(Debug)]
pub enum Message {
    Page {
        key: QueryKey,
        result: Result<Arc<Page>, String>,
    },
    HighlighterReady,
}

/// The issue shown in the detail overlay.
pub struct DetailView {
    pub issue: Issue,
    pub lines: Vec<Line<'static>>,
    /// Whether `lines` were built with the syntax highlighter.
    highlighted: bool,
}

pub struct App {
    pub mode: AppMode,
    help_return: AppMode,

    pub project: Project,
    pub search: String,
    pub search_input: String,
    pub table: TableState,

    /// The page on screen. Kept while the next one loads.
    pub page: Option<Arc<Page>>,
    pub loading: bool,
    pub error: Option<String>,
    pending: Option<QueryKey>,

    pub selected_row: usize,
    pub selected_column: usize,
    pub detail: Option<DetailView>,
    pub detail_scroll: u16,
    pub help_scroll: u16,
    pub status_message: Option<(String, Instant)>,
    pub should_quit: bool,

    pub keybindings: Keybindings,
    config: Config,
    config_path: Option<PathBuf>,
    cache: QueryCache,
    highlighter: SharedHighlighter,
    runtime: Handle,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,

    // On Linux the clipboard must stay alive to serve paste requests
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    /// Build the app from saved preferences and start loading the first
    /// page and the highlighter in the background.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        cache: QueryCache,
        highlighter: SharedHighlighter,
        runtime: Handle,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let mut app = Self {
            mode: AppMode::Normal,
            help_return: AppMode::Normal,
            project: config.query.project,
            search: config.query.search.clone(),
            search_input: String::new(),
            table: config.table_state(),
            page: None,
            loading: false,
            error: None,
            pending: None,
            selected_row: 0,
            selected_column: 0,
            detail: None,
            detail_scroll: 0,
            help_scroll: 0,
            status_message: None,
            should_quit: false,
            keybindings: config.keybindings(),
            config,
            config_path,
            cache,
            highlighter,
            runtime,
            tx,
            rx,
            clipboard: arboard::Clipboard::new().ok(),
        };
        app.warm_highlighter();
        app.load();
        app
    }

    fn warm_highlighter(&self) {
        let highlighter = self.highlighter.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            match highlighter.get().await {
                Ok(_) => {
                    let _ = tx.send(Message::HighlighterReady);
                }
                Err(err) => warn!("highlighter unavailable: {err}"),
            }
        });
    }

    /// The query key for what the table currently asks for.
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            project: self.project,
            jql: build_query(
                self.project,
                &self.search,
                &self.table.sorting,
                &self.table.filters,
            ),
            page_index: self.table.pagination.page_index,
            page_size: self.table.pagination.page_size,
        }
    }

    pub fn total(&self) -> usize {
        self.page.as_ref().map(|p| p.total).unwrap_or(0)
    }

    pub fn page_count(&self) -> usize {
        self.table.pagination.page_count(self.total())
    }

    /// Show the current page, from cache when fresh, otherwise by fetching
    /// it in the background.
    pub fn load(&mut self) {
        let key = self.query_key();
        if let Some(page) = self.cache.cached(&key) {
            self.pending = None;
            self.show_page(page);
            return;
        }

        debug!(jql = %key.jql, page = key.page_index, "requesting page");
        self.loading = true;
        self.pending = Some(key.clone());
        let cache = self.cache.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = cache.get(key.clone()).await.map_err(|err| err.to_string());
            let _ = tx.send(Message::Page { key, result });
        });
    }

    fn show_page(&mut self, page: Arc<Page>) {
        self.loading = false;
        self.error = None;
        self.selected_row = self.selected_row.min(page.issues.len().saturating_sub(1));
        let has_next = self.table.pagination.can_next(page.total);
        self.page = Some(page);

        if has_next {
            let _guard = self.runtime.enter();
            self.cache.prefetch(self.query_key().next_page());
        }
    }

    /// Apply everything background tasks have sent since the last call.
    pub fn process_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                Message::Page { key, result } => {
                    // Answers for a query the user has moved away from are dropped
                    if self.pending.as_ref() != Some(&key) {
                        continue;
                    }
                    self.pending = None;
                    match result {
                        Ok(page) => self.show_page(page),
                        Err(err) => {
                            self.loading = false;
                            self.error = Some(err);
                        }
                    }
                }
                Message::HighlighterReady => {
                    debug!("highlighter ready");
                    self.refresh_detail();
                }
            }
        }
    }

    pub fn clear_expired_status_message(&mut self) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > STATUS_TIMEOUT)
        {
            self.status_message = None;
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn visible_columns(&self) -> Vec<&'static Column> {
        self.table.visible_columns()
    }

    fn selected_column_id(&self) -> Option<&'static str> {
        self.visible_columns()
            .get(self.selected_column)
            .map(|c| c.id)
    }

    /// Keep the selection on `id` after the layout changed.
    fn follow_column(&mut self, id: &str) {
        let columns = self.visible_columns();
        self.selected_column = columns
            .iter()
            .position(|c| c.id == id)
            .unwrap_or_else(|| self.selected_column.min(columns.len().saturating_sub(1)));
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.detail
            .as_ref()
            .map(|d| &d.issue)
            .or_else(|| self.page.as_ref()?.issues.get(self.selected_row))
    }

    fn keybinding_mode(&self) -> KeybindingMode {
        match self.mode {
            AppMode::Normal => KeybindingMode::Normal,
            AppMode::Detail => KeybindingMode::Detail,
            AppMode::Search => KeybindingMode::Search,
            AppMode::Help => KeybindingMode::Help,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let mode = self.keybinding_mode();
        if let Some(action) = self.keybindings.dispatch(mode, key) {
            self.handle_action(action);
            return;
        }
        if self.mode == AppMode::Search
            && let KeyCode::Char(c) = key.code
            && !key.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.search_input.push(c);
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::NextRow => {
                let rows = self.page.as_ref().map(|p| p.issues.len()).unwrap_or(0);
                if self.selected_row + 1 < rows {
                    self.selected_row += 1;
                }
            }
            Action::PreviousRow => self.selected_row = self.selected_row.saturating_sub(1),

            Action::NextPage => {
                if self.table.pagination.next(self.total()) {
                    self.change_page();
                }
            }
            Action::PreviousPage => {
                if self.table.pagination.previous() {
                    self.change_page();
                }
            }
            Action::FirstPage => {
                self.table.pagination.first();
                self.change_page();
            }
            Action::LastPage => {
                let total = self.total();
                self.table.pagination.last(total);
                self.change_page();
            }

            Action::ColumnLeft => self.selected_column = self.selected_column.saturating_sub(1),
            Action::ColumnRight => {
                if self.selected_column + 1 < self.visible_columns().len() {
                    self.selected_column += 1;
                }
            }
            Action::CycleSort => self.edit_column(|table, id| table.toggle_sort(id), true),
            Action::HideColumn => {
                if self.visible_columns().len() > 1 {
                    self.edit_column(|table, id| table.hide(id), false);
                }
            }
            Action::ShowAllColumns => {
                let id = self.selected_column_id();
                self.table.show_all();
                if let Some(id) = id {
                    self.follow_column(id);
                }
                self.persist();
            }
            Action::MoveColumnLeft => self.edit_column(|table, id| table.shift_column(id, -1), false),
            Action::MoveColumnRight => self.edit_column(|table, id| table.shift_column(id, 1), false),
            Action::PinLeft => self.edit_column(|table, id| table.pin(id, PinSide::Left), false),
            Action::PinRight => self.edit_column(|table, id| table.pin(id, PinSide::Right), false),
            Action::Unpin => self.edit_column(|table, id| table.unpin(id), false),
            Action::WidenColumn => self.edit_column(
                |table, id| table.resize(id, table.width(id).saturating_add(RESIZE_STEP)).map(drop),
                false,
            ),
            Action::NarrowColumn => self.edit_column(
                |table, id| table.resize(id, table.width(id).saturating_sub(RESIZE_STEP)).map(drop),
                false,
            ),
            Action::ResetColumns => {
                self.table.reset_columns();
                self.selected_column = 0;
                self.persist();
            }

            Action::EditSearch => {
                self.search_input = self.search.clone();
                self.mode = AppMode::Search;
            }
            Action::ApplySearch => {
                self.search = self.search_input.trim().to_string();
                self.mode = AppMode::Normal;
                self.table.pagination.first();
                self.query_changed();
            }
            Action::CancelSearch => self.mode = AppMode::Normal,
            Action::SearchBackspace => {
                self.search_input.pop();
            }
            Action::CycleProject => {
                self.project = self.project.next();
                self.table.pagination.first();
                self.set_status(format!("Project: {}", self.project.label()));
                self.query_changed();
            }
            Action::Refresh => {
                // Prefetched neighbours would be just as stale
                self.cache.clear();
                self.load();
            }

            Action::OpenDetail => self.open_detail(),
            Action::CloseDetail => {
                self.detail = None;
                self.mode = AppMode::Normal;
            }
            Action::OpenInBrowser => self.open_in_browser(),
            Action::CopyUrl => self.copy_url(),

            Action::ScrollDown => self.scroll(1),
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollPageDown => self.scroll(10),
            Action::ScrollPageUp => self.scroll(-10),
            Action::ScrollTop => self.scroll(i32::MIN),
            Action::ScrollBottom => self.scroll(i32::MAX),

            Action::ToggleHelp => {
                if self.mode == AppMode::Help {
                    self.mode = self.help_return;
                } else {
                    self.help_return = self.mode;
                    self.help_scroll = 0;
                    self.mode = AppMode::Help;
                }
            }
            Action::Quit => self.should_quit = true,
        }
    }

    /// Run a table operation on the selected column and keep the selection
    /// on it. Operations that change the query reload the page.
    fn edit_column<F>(&mut self, op: F, reloads: bool)
    where
        F: FnOnce(&mut TableState, &str) -> crate::Result<()>,
    {
        let Some(id) = self.selected_column_id() else {
            return;
        };
        if let Err(err) = op(&mut self.table, id) {
            self.set_status(format!("✗ {err}"));
            return;
        }
        self.follow_column(id);
        if reloads {
            self.query_changed();
        } else {
            self.persist();
        }
    }

    fn change_page(&mut self) {
        self.selected_row = 0;
        self.load();
    }

    fn query_changed(&mut self) {
        self.selected_row = 0;
        self.persist();
        self.load();
    }

    /// Save the query and column layout. Failures only show in the footer.
    fn persist(&mut self) {
        self.config.query.project = self.project;
        self.config.query.search = self.search.clone();
        self.config.store_table_state(&self.table);

        let Some(path) = self.config_path.clone() else {
            return;
        };
        if let Err(err) = self.config.save_to(&path) {
            warn!("could not save preferences: {err}");
            self.set_status(format!("✗ Could not save preferences: {err}"));
        }
    }

    fn open_detail(&mut self) {
        let Some(issue) = self.page.as_ref().and_then(|p| p.issues.get(self.selected_row)) else {
            return;
        };
        let issue = issue.clone();
        self.detail = Some(self.build_detail(issue));
        self.detail_scroll = 0;
        self.mode = AppMode::Detail;
    }

    fn build_detail(&self, issue: Issue) -> DetailView {
        match self.highlighter.try_get() {
            Some(highlighter) => DetailView {
                lines: detail_lines(&issue, &*highlighter),
                issue,
                highlighted: true,
            },
            None => DetailView {
                lines: detail_lines(&issue, &PlainLines),
                issue,
                highlighted: false,
            },
        }
    }

    /// Re-render an open detail view once highlighting is available.
    fn refresh_detail(&mut self) {
        if let Some(detail) = self.detail.take() {
            self.detail = Some(if detail.highlighted {
                detail
            } else {
                self.build_detail(detail.issue)
            });
        }
    }

    fn scroll(&mut self, delta: i32) {
        let max = match self.mode {
            AppMode::Detail => self
                .detail
                .as_ref()
                .map(|d| d.lines.len().saturating_sub(1))
                .unwrap_or(0),
            _ => usize::from(u16::MAX),
        };
        let target = match self.mode {
            AppMode::Help => &mut self.help_scroll,
            _ => &mut self.detail_scroll,
        };
        let next = (i64::from(*target) + i64::from(delta)).clamp(0, max as i64);
        *target = u16::try_from(next).unwrap_or(u16::MAX);
    }

    fn open_in_browser(&mut self) {
        let Some(url) = self.selected_issue().map(Issue::browse_url) else {
            return;
        };
        match open::that(&url) {
            Ok(()) => self.set_status(format!("✓ Opened {url}")),
            Err(err) => self.set_status(format!("✗ Could not open browser: {err}")),
        }
    }

    fn copy_url(&mut self) {
        let Some(url) = self.selected_issue().map(Issue::browse_url) else {
            return;
        };
        let result = match &mut self.clipboard {
            Some(clipboard) => clipboard.set_text(url.clone()).map_err(|e| e.to_string()),
            None => Err("clipboard not available".to_string()),
        };
        match result {
            Ok(()) => self.set_status(format!("✓ Copied {url}")),
            Err(err) => self.set_status(format!("✗ Clipboard error: {err}")),
        }
    }
}
