//! Interactive Directory
//!
//! Terminal front end: search box, filter dropdowns, certification
//! checkboxes and an infinitely scrolling list of expandable cards.

mod app;
mod dropdown;
mod ui;

pub use app::{App, AppEvent, Focus, OPTIONS_ERROR, SEARCH_ERROR};
pub use dropdown::{Dropdown, DropdownKind};

use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::config::DirectoryConfig;
use crate::directory::DirectoryService;

pub struct DirectoryTui {
    service: Arc<dyn DirectoryService>,
    config: DirectoryConfig,
}

impl DirectoryTui {
    pub fn new(service: Arc<dyn DirectoryService>, config: DirectoryConfig) -> Self {
        Self { service, config }
    }

    pub async fn run(self) -> Result<()> {
        enable_raw_mode()?;
        let mut terminal = or_restore(
            || {
                stdout().execute(EnterAlternateScreen)?;
                Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
            },
            restore_terminal,
        )?;

        let mut app = App::new(self.service, &self.config);
        app.start();
        info!("directory ui started");

        let result = event_loop(&mut terminal, &mut app);

        // Restore the terminal even when the loop failed
        restore_terminal()?;
        info!("directory ui stopped");
        result
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run `setup`; if it fails, run `restore` before handing back the setup error
fn or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    setup().map_err(|e| {
        if let Err(restore_err) = restore() {
            warn!("failed to restore terminal: {}", restore_err);
        }
        e
    })
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(50);

    while !app.should_quit {
        terminal.draw(|f| ui::ui(f, app))?;

        // Responses and debounced triggers
        app.process_pending();

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
