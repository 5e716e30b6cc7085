//! Repeating poll timer with pause support.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::config::TargetConfig;

/// Lifecycle of the poll timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No timer.
    #[default]
    Idle,
    /// Timer running, ticks do work.
    Active,
    /// Timer running, ticks are skipped.
    Suspended,
}

impl SchedulerState {
    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Active => "live",
            SchedulerState::Suspended => "paused",
        }
    }
}

/// Owns the fixed-period timer that drives polling.
///
/// Pausing only sets a flag: the timer keeps running so resuming picks up at
/// the next natural boundary without rescheduling.
#[derive(Debug, Default)]
pub struct PollScheduler {
    ticker: Option<Interval>,
    period: Option<Duration>,
    paused: bool,
    torn_down: bool,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the timer for `config`, or stop it if no target is set.
    ///
    /// Must be called from within a tokio runtime.
    pub fn configure(&mut self, config: &TargetConfig) {
        self.stop();
        if self.torn_down || config.target_id.is_none() {
            return;
        }
        self.start(config.refresh_interval());
    }

    fn start(&mut self, period: Duration) {
        // First boundary is one full period away, not immediate.
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.period = Some(period);
    }

    fn stop(&mut self) {
        self.ticker = None;
        self.period = None;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the paused flag. Returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Period of the running timer.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn state(&self) -> SchedulerState {
        match (self.is_running(), self.paused) {
            (false, _) => SchedulerState::Idle,
            (true, false) => SchedulerState::Active,
            (true, true) => SchedulerState::Suspended,
        }
    }

    /// Whether a tick firing now should do any work.
    pub fn should_work(&self) -> bool {
        self.state() == SchedulerState::Active
    }

    /// Wait for the next timer boundary.
    ///
    /// Pending forever while idle, so it can sit in a `select!` next to
    /// other event sources.
    pub async fn next_tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Stop for good. Later `configure` calls are ignored.
    pub fn teardown(&mut self) {
        self.stop();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
