//! Recently displayed frames, for the history list and frame-rate readout.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::source::{ChangeToken, Snapshot};

/// Maximum number of frames to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// A frame that was put on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub display_name: Option<String>,
    pub group_label: Option<String>,
    pub change_token: Option<ChangeToken>,
    pub observed_at: Instant,
}

impl FrameRecord {
    pub fn from_snapshot(snapshot: &Snapshot, observed_at: Instant) -> Self {
        Self {
            display_name: snapshot.display_name.clone(),
            group_label: snapshot.group_label.clone(),
            change_token: snapshot.change_token,
            observed_at,
        }
    }
}

/// Bounded list of recently displayed frames, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameHistory {
    frames: VecDeque<FrameRecord>,
}

impl FrameHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly displayed frame
    pub fn record(&mut self, frame: FrameRecord) {
        self.frames.push_back(frame);
        if self.frames.len() > MAX_HISTORY_SIZE {
            self.frames.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn latest(&self) -> Option<&FrameRecord> {
        self.frames.back()
    }

    /// Most recent frames first, at most `n`.
    pub fn recent(&self, n: usize) -> Vec<FrameRecord> {
        self.frames.iter().rev().take(n).cloned().collect()
    }

    /// Average time between consecutive frames.
    ///
    /// Returns None if there's not enough history.
    pub fn average_interval(&self) -> Option<Duration> {
        if self.frames.len() < 2 {
            return None;
        }

        let first = self.frames.front()?.observed_at;
        let last = self.frames.back()?.observed_at;
        let gaps = (self.frames.len() - 1) as u32;

        Some(last.duration_since(first) / gaps)
    }
}
