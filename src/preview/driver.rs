//! Runs a [`PreviewController`] on its own task.
//!
//! The driver is the event loop of a preview: one task that multiplexes host
//! commands and timer ticks. A tick awaits its probe inline, so tick bodies
//! never overlap, and commands that arrive during a probe are handled right
//! after it. Surfaces read an immutable [`PreviewView`] through a watch
//! channel and talk back through a [`PreviewHandle`].
//!
//! ```no_run
//! use nebula_live::preview::{PreviewController, PreviewDriver};
//! use nebula_live::source::HttpSource;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder().build().unwrap();
//! let (handle, task) = PreviewDriver::new(PreviewController::new(Box::new(source))).spawn();
//!
//! handle
//!     .deliver(json!({ "ui": { "nebula_live_project_id": ["my-project"] } }))
//!     .await
//!     .unwrap();
//! println!("{}", handle.view().display.status_text);
//!
//! handle.shutdown().await.unwrap();
//! task.await.unwrap();
//! # });
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::controller::PreviewController;
use super::display::DisplayState;
use super::scheduler::SchedulerState;
use crate::data::FrameRecord;
use crate::source::{LiveSource, Target};

/// Number of frames exposed in the view.
const VIEW_FRAMES: usize = 10;

/// Capacity of the command queue.
const COMMAND_QUEUE: usize = 16;

/// Host and user intents delivered to the driver.
#[derive(Debug)]
pub enum Command {
    /// A raw execution-result message.
    Execution(Value),
    TogglePause,
    /// Resolve the latest content URL.
    OpenLatest(oneshot::Sender<Option<String>>),
    Shutdown,
}

/// Read-only picture of a preview, published after every event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewView {
    pub display: DisplayState,
    pub state: SchedulerState,
    pub paused: bool,
    pub pause_label: &'static str,
    pub target_id: Option<String>,
    pub refresh_interval: Duration,
    pub include_subdirectories: bool,
    /// Most recent frames first.
    pub recent_frames: Vec<FrameRecord>,
    pub average_frame_interval: Option<Duration>,
    pub source: String,
}

impl PreviewView {
    pub fn from_controller(controller: &PreviewController) -> Self {
        let config = controller.config();
        let history = controller.history();
        Self {
            display: controller.display().clone(),
            state: controller.scheduler_state(),
            paused: controller.is_paused(),
            pause_label: controller.pause_label(),
            target_id: config.target_id.clone(),
            refresh_interval: config.refresh_interval(),
            include_subdirectories: config.include_subdirectories,
            recent_frames: history.recent(VIEW_FRAMES),
            average_frame_interval: history.average_interval(),
            source: controller.source_description().to_string(),
        }
    }
}

/// Builder for the preview task.
pub struct PreviewDriver {
    controller: PreviewController,
    on_teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl PreviewDriver {
    pub fn new(controller: PreviewController) -> Self {
        Self {
            controller,
            on_teardown: None,
        }
    }

    /// Hook run after the controller has been torn down.
    pub fn on_teardown(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_teardown = Some(Box::new(hook));
        self
    }

    /// Spawn the event loop on the current tokio runtime.
    pub fn spawn(self) -> (PreviewHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (view_tx, view_rx) = watch::channel(PreviewView::from_controller(&self.controller));
        let source = self.controller.source();

        let task = tokio::spawn(run(self.controller, command_rx, view_tx, self.on_teardown));

        let handle = PreviewHandle {
            commands: command_tx,
            view: view_rx,
            source,
        };
        (handle, task)
    }
}

async fn run(
    mut controller: PreviewController,
    mut commands: mpsc::Receiver<Command>,
    view: watch::Sender<PreviewView>,
    on_teardown: Option<Box<dyn FnOnce() + Send>>,
) {
    debug!(source = controller.source_description(), "preview driver started");

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => handle_command(&mut controller, command),
            },
            _ = controller.next_tick() => {
                let report = controller.tick().await;
                trace!(?report, "tick");
            }
        }

        publish(&view, &controller);
    }

    controller.teardown();
    publish(&view, &controller);

    if let Some(hook) = on_teardown {
        hook();
    }
    debug!("preview driver stopped");
}

fn handle_command(controller: &mut PreviewController, command: Command) {
    match command {
        Command::Execution(message) => {
            controller.handle_execution(&message);
        }
        Command::TogglePause => {
            controller.toggle_pause();
        }
        Command::OpenLatest(reply) => {
            let _ = reply.send(controller.open_latest());
        }
        Command::Shutdown => {}
    }
}

fn publish(view: &watch::Sender<PreviewView>, controller: &PreviewController) {
    let next = PreviewView::from_controller(controller);
    view.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

/// Client side of a running preview.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<PreviewView>,
    source: Arc<dyn LiveSource>,
}

impl PreviewHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("preview driver has stopped"))
    }

    /// Queue a command without waiting. Fails if the queue is full.
    pub fn try_send(&self, command: Command) -> Result<()> {
        self.commands
            .try_send(command)
            .map_err(|e| anyhow!("could not queue command: {}", e))
    }

    /// Deliver an execution-result message from the host.
    pub async fn deliver(&self, message: Value) -> Result<()> {
        self.send(Command::Execution(message)).await
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(Command::TogglePause).await
    }

    /// Resolve the URL of the latest full image.
    pub async fn open_latest(&self) -> Result<Option<String>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::OpenLatest(tx)).await?;
        rx.await.map_err(|_| anyhow!("preview driver has stopped"))
    }

    /// URL of the latest full image for the last published configuration.
    ///
    /// Built locally without queueing a command, so it answers immediately
    /// even while a poll is in flight.
    pub fn latest_url(&self) -> Option<String> {
        let view = self.view.borrow();
        let target = Target::new(view.target_id.clone()?, view.include_subdirectories);
        Some(self.source.content_url(&target))
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Snapshot of the latest published view.
    pub fn view(&self) -> PreviewView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<PreviewView> {
        self.view.clone()
    }
}
