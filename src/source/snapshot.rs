//! Snapshot types for the live endpoint.
//!
//! [`LiveInfo`] matches the JSON body served by `live_info`. It is
//! normalised into a [`Snapshot`], the format the rest of the crate works
//! with.

use serde::{Deserialize, Serialize};

/// Opaque change token for the latest artifact.
///
/// The endpoint reports the file modification time in seconds (possibly
/// fractional). Tokens are only compared for equality and only within the
/// namespace of a single target.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ChangeToken(f64);

impl ChangeToken {
    /// Create a token from a modification time in seconds since the epoch.
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// The modification time in seconds since the epoch.
    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

/// Body returned by `GET /live_info` with status 200.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveInfo {
    /// Whether the project has produced an image yet.
    #[serde(default)]
    pub has_image: bool,

    /// Modification time of the latest image, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<f64>,

    /// File name of the latest image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Loop sub-directory the image was written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_dir: Option<String>,
}

/// Result of a single metadata probe.
///
/// Produced fresh on every probe and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub exists: bool,
    pub change_token: Option<ChangeToken>,
    pub display_name: Option<String>,
    pub group_label: Option<String>,
}

impl Snapshot {
    /// Snapshot for a target that has no artifact yet.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Snapshot for an existing artifact.
    pub fn present(token: f64) -> Self {
        Self {
            exists: true,
            change_token: Some(ChangeToken::from_secs(token)),
            display_name: None,
            group_label: None,
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the group label.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group_label = Some(group.into());
        self
    }
}

impl From<LiveInfo> for Snapshot {
    fn from(info: LiveInfo) -> Self {
        if !info.has_image {
            return Snapshot::missing();
        }
        Snapshot {
            exists: true,
            change_token: info.mtime.map(ChangeToken::from_secs),
            display_name: info.filename.filter(|s| !s.is_empty()),
            group_label: info.loop_dir.filter(|s| !s.is_empty()),
        }
    }
}
