//! Change detection over successive snapshots.
//!
//! Uses the snapshot's change token (modification time) as a proxy for
//! content identity, so unchanged frames are neither re-fetched nor redrawn.

use crate::source::{ChangeToken, Snapshot};

/// What the detector has seen so far.
///
/// "Nothing yet" differs from "an existing artifact without a token": the
/// first existing snapshot is always a change, even when its token is absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum LastSeen {
    #[default]
    Nothing,
    Token(Option<ChangeToken>),
}

/// Outcome of observing one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub changed: bool,
    pub token: Option<ChangeToken>,
}

/// Tracks the last seen change token of a single target.
///
/// Tokens are only comparable within one target; call [`reset`] (or build a
/// new detector) whenever the target changes.
///
/// [`reset`]: ChangeDetector::reset
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_seen: LastSeen,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a snapshot against the last seen token.
    ///
    /// Snapshots without an artifact never count as a change and leave the
    /// state untouched.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Observation {
        let token = snapshot.change_token;

        if !snapshot.exists {
            return Observation {
                changed: false,
                token,
            };
        }

        let changed = self.last_seen != LastSeen::Token(token);
        if changed {
            self.last_seen = LastSeen::Token(token);
        }

        Observation { changed, token }
    }

    /// Forget everything seen so far.
    pub fn reset(&mut self) {
        self.last_seen = LastSeen::Nothing;
    }

    /// The last token reported as a change, if any.
    pub fn last_token(&self) -> Option<ChangeToken> {
        match self.last_seen {
            LastSeen::Token(token) => token,
            LastSeen::Nothing => None,
        }
    }
}
