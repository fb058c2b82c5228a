use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::dropdown::{Dropdown, DropdownKind};
use crate::config::DirectoryConfig;
use crate::directory::card::CardState;
use crate::directory::{
    Debouncer, DirectoryService, FilterOptions, PageMode, PageOutcome, PageRequest, Pager,
    PsychologistRecord, PsychologistRow, SearchFilters,
};

pub const OPTIONS_ERROR: &str =
    "Failed to fetch specialties. Please check your Supabase configuration.";
pub const SEARCH_ERROR: &str =
    "Failed to fetch psychologists. Please check your Supabase configuration.";

/// Events delivered to the UI loop from background tasks and timers
#[derive(Debug)]
pub enum AppEvent {
    OptionsLoaded(Result<FilterOptions, String>),
    PageLoaded {
        request: PageRequest,
        result: Result<Vec<PsychologistRow>, String>,
    },
    /// Typing in the search box has paused
    SearchSettled,
    /// The selection stayed near the end of the list
    LoadMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Specialties,
    Branches,
    Dgpc,
    Tsa,
    Expert,
    Results,
}

const FOCUS_ORDER: [Focus; 7] = [
    Focus::Search,
    Focus::Specialties,
    Focus::Branches,
    Focus::Dgpc,
    Focus::Tsa,
    Focus::Expert,
    Focus::Results,
];

/// TUI Application State
pub struct App {
    service: Arc<dyn DirectoryService>,
    pub filters: SearchFilters,
    pub options: FilterOptions,
    pub pager: Pager,
    /// Card state by position in the result list
    cards: HashMap<usize, CardState>,
    pub selected: usize,
    pub focus: Focus,
    pub dropdown: Option<Dropdown>,
    options_error: Option<String>,
    search_error: Option<String>,
    pub should_quit: bool,
    scroll_threshold: usize,
    search_debounce: Debouncer<AppEvent>,
    scroll_debounce: Debouncer<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(service: Arc<dyn DirectoryService>, config: &DirectoryConfig) -> Self {
        let (tx, rx) = mpsc::channel(100);
        Self {
            service,
            filters: SearchFilters::new(),
            options: FilterOptions::default(),
            pager: Pager::new(config.page_size),
            cards: HashMap::new(),
            selected: 0,
            focus: Focus::Search,
            dropdown: None,
            options_error: None,
            search_error: None,
            should_quit: false,
            scroll_threshold: config.scroll_threshold,
            search_debounce: Debouncer::new(config.debounce, tx.clone()),
            scroll_debounce: Debouncer::new(config.debounce, tx.clone()),
            event_tx: tx,
            event_rx: rx,
        }
    }

    /// Load filter options and the unfiltered first page
    pub fn start(&mut self) {
        let service = self.service.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.filter_options().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::OptionsLoaded(result)).await;
        });
        self.run_search();
    }

    pub fn records(&self) -> &[PsychologistRecord] {
        self.pager.records()
    }

    pub fn card_state(&self, index: usize) -> Option<&CardState> {
        self.cards.get(&index)
    }

    /// Message for the status bar; a search failure outranks an options failure
    pub fn error(&self) -> Option<&str> {
        self.search_error.as_deref().or(self.options_error.as_deref())
    }

    /// Restart from page zero if the filters changed
    fn run_search(&mut self) {
        if let Some(request) = self.pager.search(&self.filters) {
            self.dispatch(request);
        }
    }

    fn load_more(&mut self) {
        if let Some(request) = self.pager.load_more() {
            self.dispatch(request);
        }
    }

    fn dispatch(&mut self, request: PageRequest) {
        if request.mode == PageMode::Replace {
            self.scroll_debounce.cancel();
        }

        let service = self.service.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.search(request.params()).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::PageLoaded { request, result }).await;
        });
    }

    /// Drain events that are already waiting
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the next event and handle it
    pub async fn process_next(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::OptionsLoaded(Ok(options)) => {
                info!(
                    specialties = options.specialties.len(),
                    branches = options.branches.len(),
                    "filter options ready"
                );
                self.options = options;
                self.options_error = None;
            }
            AppEvent::OptionsLoaded(Err(e)) => {
                error!("Error fetching specialties: {}", e);
                self.options_error = Some(OPTIONS_ERROR.to_string());
            }
            AppEvent::PageLoaded { request, result } => match result {
                Ok(rows) => {
                    let outcome = self.pager.complete(&request, rows);
                    if let PageOutcome::Applied { .. } = outcome {
                        self.search_error = None;
                        if request.mode == PageMode::Replace {
                            self.selected = 0;
                            self.cards.clear();
                        }
                        // Selection may already sit near the new end
                        self.maybe_load_more();
                    }
                }
                Err(e) => {
                    if self.pager.fail(&request, e.clone()) {
                        error!("Error fetching psychologists: {}", e);
                        self.search_error = Some(SEARCH_ERROR.to_string());
                    } else {
                        warn!("ignoring failure of superseded request: {}", e);
                    }
                }
            },
            AppEvent::SearchSettled => self.run_search(),
            AppEvent::LoadMore => self.load_more(),
        }
    }

    fn maybe_load_more(&mut self) {
        if self.focus != Focus::Results || !self.pager.has_more() || self.pager.is_loading() {
            return;
        }
        let len = self.records().len();
        if len == 0 || self.selected + self.scroll_threshold >= len.saturating_sub(1) {
            self.scroll_debounce.trigger(AppEvent::LoadMore);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.dropdown.is_some() {
            self.handle_dropdown_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.cycle_focus(1);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_focus(-1);
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Specialties | Focus::Branches => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Down | KeyCode::Char(' ')) {
                    let kind = if self.focus == Focus::Specialties {
                        DropdownKind::Specialties
                    } else {
                        DropdownKind::Branches
                    };
                    self.dropdown = Some(Dropdown::new(kind));
                }
            }
            Focus::Dgpc | Focus::Tsa | Focus::Expert => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.toggle_flag(self.focus);
                }
            }
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn cycle_focus(&mut self, delta: isize) {
        let pos = FOCUS_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let len = FOCUS_ORDER.len() as isize;
        self.focus = FOCUS_ORDER[((pos + delta).rem_euclid(len)) as usize];
        if self.focus == Focus::Results {
            self.maybe_load_more();
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.filters.name.push(c);
                self.search_debounce.trigger(AppEvent::SearchSettled);
            }
            KeyCode::Backspace => {
                self.filters.name.pop();
                self.search_debounce.trigger(AppEvent::SearchSettled);
            }
            KeyCode::Enter => {
                self.search_debounce.cancel();
                self.run_search();
            }
            KeyCode::Down => {
                self.search_debounce.cancel();
                self.run_search();
                self.focus = Focus::Results;
                self.maybe_load_more();
            }
            _ => {}
        }
    }

    fn handle_dropdown_key(&mut self, key: KeyEvent) {
        let Some(mut dropdown) = self.dropdown.take() else {
            return;
        };
        let options = match dropdown.kind {
            DropdownKind::Specialties => &self.options.specialties,
            DropdownKind::Branches => &self.options.branches,
        };
        let visible_len = dropdown.visible(options).len();

        match key.code {
            KeyCode::Esc => return,
            KeyCode::Up => dropdown.move_cursor(-1, visible_len),
            KeyCode::Down => dropdown.move_cursor(1, visible_len),
            KeyCode::Backspace => dropdown.pop(),
            KeyCode::Char(c) => dropdown.push(c),
            KeyCode::Enter => {
                if let Some(option) = dropdown.current(options).map(str::to_string) {
                    match dropdown.kind {
                        DropdownKind::Specialties => self.filters.toggle_specialty(&option),
                        DropdownKind::Branches => self.filters.toggle_branch(&option),
                    }
                    self.run_search();
                }
            }
            _ => {}
        }
        self.dropdown = Some(dropdown);
    }

    fn toggle_flag(&mut self, focus: Focus) {
        match focus {
            Focus::Dgpc => self.filters.dgpc = !self.filters.dgpc,
            Focus::Tsa => self.filters.tsa = !self.filters.tsa,
            Focus::Expert => self.filters.expert = !self.filters.expert,
            _ => return,
        }
        self.run_search();
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let len = self.records().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1, len),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1, len),
            KeyCode::PageDown => self.move_selection(10, len),
            KeyCode::PageUp => self.move_selection(-10, len),
            KeyCode::Home => self.move_selection(-(len as isize), len),
            KeyCode::End => self.move_selection(len as isize, len),
            KeyCode::Enter => {
                if self.selected < len {
                    self.cards.entry(self.selected).or_default().toggle();
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some((state, count)) = self.expanded_card() {
                    state.toggle_specialty(index, count);
                }
            }
            KeyCode::Left => {
                if let Some((state, count)) = self.expanded_card() {
                    state.move_cursor(-1, count);
                }
            }
            KeyCode::Right => {
                if let Some((state, count)) = self.expanded_card() {
                    state.move_cursor(1, count);
                }
            }
            KeyCode::Char(' ') => {
                if let Some((state, count)) = self.expanded_card() {
                    state.toggle_cursor(count);
                }
            }
            KeyCode::Char('r') => {
                if let Some(request) = self.pager.refresh() {
                    self.dispatch(request);
                }
            }
            _ => {}
        }
    }

    /// State of the selected card when it is expanded, with its specialty count
    fn expanded_card(&mut self) -> Option<(&mut CardState, usize)> {
        let count = self.records().get(self.selected)?.specialitati.len();
        self.cards
            .get_mut(&self.selected)
            .filter(|state| state.expanded)
            .map(|state| (state, count))
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len as isize - 1) as usize;
        self.maybe_load_more();
    }
}
