//! The preview state machine.
//!
//! [`PreviewController`] owns every piece of per-widget state: the target
//! configuration, the change detector, the poll scheduler and the display.
//! Host messages and user intents come in through `&mut self` methods; the
//! periodic work happens in [`PreviewController::tick`].
//!
//! A tick is split in two halves so the network call can be awaited without
//! holding any state: [`begin_tick`] captures the target and configuration
//! epoch, [`finish_tick`] applies the probe result. Results that belong to an
//! older epoch (the host re-armed while the probe was in flight) are dropped.
//!
//! [`begin_tick`]: PreviewController::begin_tick
//! [`finish_tick`]: PreviewController::finish_tick

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::config::TargetConfig;
use super::detector::ChangeDetector;
use super::display::{self, DisplayState};
use super::message::HostUpdate;
use super::scheduler::{PollScheduler, SchedulerState};
use crate::data::{FrameHistory, FrameRecord};
use crate::source::{LiveSource, ProbeError, Snapshot, Target};

/// What a host message did to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arming {
    /// The message carried no `ui` block.
    Ignored,
    /// The host reported an error; polling was not (re)armed.
    Rejected,
    /// No target is known yet.
    Waiting,
    /// Polling was (re)started for the target.
    Armed,
}

/// A tick in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickTicket {
    epoch: u64,
    target: Target,
}

impl TickTicket {
    pub fn target(&self) -> &Target {
        &self.target
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    /// Paused, idle or torn down; nothing was probed.
    Skipped,
    /// The result belonged to a previous configuration.
    Stale,
    /// The target has no image yet.
    NoArtifact,
    /// Same frame as before; only the status text was refreshed.
    Unchanged,
    /// A new frame was put on screen.
    Changed,
    /// The probe failed; the image was left alone.
    Failed(ProbeError),
}

/// Orchestrates polling and display for one preview.
#[derive(Debug)]
pub struct PreviewController {
    source: Arc<dyn LiveSource>,
    config: TargetConfig,
    detector: ChangeDetector,
    scheduler: PollScheduler,
    display: DisplayState,
    history: FrameHistory,
    epoch: u64,
}

impl PreviewController {
    /// Create a controller with no target.
    pub fn new(source: Box<dyn LiveSource>) -> Self {
        Self {
            source: Arc::from(source),
            config: TargetConfig::default(),
            detector: ChangeDetector::new(),
            scheduler: PollScheduler::new(),
            display: DisplayState::default(),
            history: FrameHistory::new(),
            epoch: 0,
        }
    }

    /// Shared handle to the live source, for building content URLs elsewhere.
    pub fn source(&self) -> Arc<dyn LiveSource> {
        self.source.clone()
    }

    /// Returns a description of the live source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Label for the pause/resume control.
    pub fn pause_label(&self) -> &'static str {
        if self.scheduler.is_paused() {
            "Resume"
        } else {
            "Pause"
        }
    }

    /// Handle a raw execution-result message from the host.
    pub fn handle_execution(&mut self, message: &Value) -> Arming {
        match HostUpdate::from_message(message) {
            Some(update) => self.apply_update(update),
            None => {
                debug!("execution message without ui block");
                Arming::Ignored
            }
        }
    }

    /// Apply a decoded host update.
    pub fn apply_update(&mut self, update: HostUpdate) -> Arming {
        if self.scheduler.is_torn_down() {
            return Arming::Ignored;
        }

        if let Some(error) = update.error {
            warn!(error = %error, "host reported an error");
            self.display.set_status(error);
            return Arming::Rejected;
        }

        if self.config.merge(&update.delta) {
            // Tokens are only comparable within one target.
            self.detector.reset();
            self.history.clear();
        }

        let Some(target_id) = self.config.target_id.clone() else {
            self.display.set_status(display::WAITING_STATUS);
            return Arming::Waiting;
        };

        self.epoch += 1;
        self.scheduler.configure(&self.config);
        self.display
            .set_status(display::armed_status(&target_id, update.delta.target_exists));

        info!(
            project = %target_id,
            refresh_ms = self.config.refresh_interval_ms,
            include_subdirs = self.config.include_subdirectories,
            epoch = self.epoch,
            "live preview armed"
        );
        Arming::Armed
    }

    /// Flip pause. Returns true if now paused.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.scheduler.toggle_pause();
        info!(paused, "preview pause toggled");
        paused
    }

    /// URL of the latest full image, for the host to open externally.
    ///
    /// `None` when no target is configured. Never touches the network.
    pub fn open_latest(&self) -> Option<String> {
        let target = self.config.target()?;
        Some(self.source.content_url(&target))
    }

    /// Wait for the next scheduler boundary. Pending forever while idle.
    pub async fn next_tick(&mut self) {
        self.scheduler.next_tick().await;
    }

    /// Run one tick: probe, detect, maybe update the image.
    pub async fn tick(&mut self) -> TickReport {
        let Some(ticket) = self.begin_tick() else {
            return TickReport::Skipped;
        };
        let result = self.source.probe(ticket.target()).await;
        self.finish_tick(ticket, result)
    }

    /// Start a tick if the scheduler allows work.
    pub fn begin_tick(&self) -> Option<TickTicket> {
        if !self.scheduler.should_work() {
            return None;
        }
        let target = self.config.target()?;
        Some(TickTicket {
            epoch: self.epoch,
            target,
        })
    }

    /// Apply the probe result of a tick started with [`begin_tick`].
    ///
    /// [`begin_tick`]: PreviewController::begin_tick
    pub fn finish_tick(
        &mut self,
        ticket: TickTicket,
        result: Result<Snapshot, ProbeError>,
    ) -> TickReport {
        if ticket.epoch != self.epoch || self.scheduler.is_torn_down() {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "dropping stale probe result"
            );
            return TickReport::Stale;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => return self.record_failure(err),
        };

        if !snapshot.exists {
            self.display
                .set_status(display::no_images_status(&ticket.target.id));
            return TickReport::NoArtifact;
        }

        let observation = self.detector.observe(&snapshot);
        let report = if observation.changed {
            self.display
                .set_image(self.source.content_url(&ticket.target));
            self.history
                .record(FrameRecord::from_snapshot(&snapshot, Instant::now()));
            debug!(
                revision = self.display.image_revision,
                name = snapshot.display_name.as_deref().unwrap_or("latest"),
                "new frame"
            );
            TickReport::Changed
        } else {
            TickReport::Unchanged
        };

        self.display.set_status(display::frame_status(&snapshot));
        report
    }

    fn record_failure(&mut self, err: ProbeError) -> TickReport {
        match err.status() {
            Some(code) => {
                debug!(status = code, "live info returned an error status");
                self.display.set_status(display::transport_error_status(code));
            }
            None => {
                warn!(error = %err, "polling error");
                self.display.set_status(display::UNEXPECTED_FAILURE_STATUS);
            }
        }
        TickReport::Failed(err)
    }

    /// Stop polling for good.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        info!("live preview torn down");
    }
}
