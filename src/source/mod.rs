//! Live source abstraction for probing the latest project image.
//!
//! This module provides a trait-based abstraction over the remote store that
//! serves project previews. The HTTP implementation talks to the `live_info`
//! and `live_image` endpoints; tests substitute scripted sources.

mod error;
mod http;
mod snapshot;

pub use error::ProbeError;
pub use http::{CacheBuster, HttpSource, HttpSourceBuilder, DEFAULT_ENDPOINT};
pub use snapshot::{ChangeToken, LiveInfo, Snapshot};

use std::fmt::Debug;

use async_trait::async_trait;

/// The project being monitored, as seen by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Project identifier.
    pub id: String,
    /// Whether loop sub-directories are scanned for images.
    pub include_subdirectories: bool,
}

impl Target {
    pub fn new(id: impl Into<String>, include_subdirectories: bool) -> Self {
        Self {
            id: id.into(),
            include_subdirectories,
        }
    }

    /// Value of the `subdirs` query parameter.
    pub fn subdirs_flag(&self) -> &'static str {
        if self.include_subdirectories {
            "1"
        } else {
            "0"
        }
    }
}

/// Trait for querying the latest artifact of a target.
///
/// Implementations perform at most one network call per [`probe`] and never
/// retry; the poll cadence is the retry policy.
///
/// [`probe`]: LiveSource::probe
#[async_trait]
pub trait LiveSource: Send + Sync + Debug {
    /// Fetch metadata about the latest artifact.
    async fn probe(&self, target: &Target) -> Result<Snapshot, ProbeError>;

    /// Build a cache-busted URL for the full artifact.
    ///
    /// Pure: never performs I/O.
    fn content_url(&self, target: &Target) -> String;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdirs_flag() {
        assert_eq!(Target::new("p", true).subdirs_flag(), "1");
        assert_eq!(Target::new("p", false).subdirs_flag(), "0");
    }
}
