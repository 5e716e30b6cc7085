//! Terminal application state.
//!
//! The TUI runs on the main thread outside the tokio runtime. It reads the
//! preview through the driver's watch channel and sends user intents back
//! through a [`PreviewHandle`].

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::preview::{Command, PreviewHandle, PreviewView};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Opens a content URL outside the terminal.
pub trait Opener: Send {
    fn open(&self, url: &str) -> Result<()>;
}

/// Hands the URL to the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).with_context(|| format!("failed to open {}", url))
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    /// Latest view published by the driver.
    pub view: PreviewView,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    handle: PreviewHandle,
    updates: watch::Receiver<PreviewView>,
    opener: Box<dyn Opener>,
}

impl App {
    /// Create an app with a theme matching the terminal background.
    pub fn new(handle: PreviewHandle, opener: Box<dyn Opener>) -> Self {
        Self::with_theme(handle, opener, Theme::auto_detect())
    }

    pub fn with_theme(handle: PreviewHandle, opener: Box<dyn Opener>, theme: Theme) -> Self {
        let mut updates = handle.subscribe();
        let view = updates.borrow_and_update().clone();
        Self {
            running: true,
            show_help: false,
            view,
            theme,
            status_message: None,
            handle,
            updates,
            opener,
        }
    }

    pub fn source_description(&self) -> &str {
        &self.view.source
    }

    /// Pick up the latest view if the driver published a new one.
    ///
    /// Returns true if the view changed.
    pub fn poll_view(&mut self) -> bool {
        match self.updates.has_changed() {
            Ok(true) => {
                self.view = self.updates.borrow_and_update().clone();
                true
            }
            // A closed channel means the driver stopped; keep the last view.
            Ok(false) | Err(_) => false,
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    pub fn toggle_pause(&mut self) {
        if let Err(e) = self.handle.try_send(Command::TogglePause) {
            self.set_status_message(format!("Pause failed: {}", e));
        }
    }

    /// Open the latest full image with the configured opener.
    ///
    /// Never waits on the driver, so a slow poll cannot freeze the UI.
    pub fn open_latest(&mut self) {
        match self.handle.latest_url() {
            Some(url) => match self.opener.open(&url) {
                Ok(()) => {
                    info!(%url, "opened latest image");
                    self.set_status_message(format!("Opened {}", url));
                }
                Err(e) => {
                    warn!(%url, error = %e, "could not open latest image");
                    self.set_status_message(format!("Open manually: {}", url));
                }
            },
            None => self.set_status_message("No project selected".to_string()),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit and stop the preview.
    pub fn quit(&mut self) {
        self.running = false;
        // The driver also tears down when every handle is dropped.
        let _ = self.handle.try_send(Command::Shutdown);
    }
}
