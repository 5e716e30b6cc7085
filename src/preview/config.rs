//! Target configuration and partial updates from the host.

use std::time::Duration;

use crate::source::Target;

/// Refresh interval used when none (or an unusable one) was provided.
pub const DEFAULT_REFRESH_MS: u64 = 750;

/// What is being polled and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub target_id: Option<String>,
    pub refresh_interval_ms: u64,
    pub include_subdirectories: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            target_id: None,
            refresh_interval_ms: DEFAULT_REFRESH_MS,
            include_subdirectories: true,
        }
    }
}

impl TargetConfig {
    /// The polling period. Never zero.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    /// The target to probe, if one is configured.
    pub fn target(&self) -> Option<Target> {
        self.target_id
            .as_ref()
            .map(|id| Target::new(id.clone(), self.include_subdirectories))
    }

    /// Merge present fields of `delta`; absent fields keep their values.
    ///
    /// Returns true if the target identifier changed.
    pub fn merge(&mut self, delta: &ConfigDelta) -> bool {
        let mut target_changed = false;

        if let Some(ref id) = delta.target_id {
            target_changed = self.target_id.as_deref() != Some(id.as_str());
            self.target_id = Some(id.clone());
        }
        if let Some(ms) = delta.refresh_interval_ms {
            self.refresh_interval_ms = ms.max(1);
        }
        if let Some(include) = delta.include_subdirectories {
            self.include_subdirectories = include;
        }

        target_changed
    }
}

/// Incoming partial configuration. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDelta {
    pub target_id: Option<String>,
    pub refresh_interval_ms: Option<u64>,
    pub include_subdirectories: Option<bool>,
    /// Whether the host found the project folder on disk.
    pub target_exists: Option<bool>,
}

impl ConfigDelta {
    /// True if no field is present.
    pub fn is_empty(&self) -> bool {
        self.target_id.is_none()
            && self.refresh_interval_ms.is_none()
            && self.include_subdirectories.is_none()
            && self.target_exists.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TargetConfig::default();
        assert!(config.target_id.is_none());
        assert_eq!(config.refresh_interval(), Duration::from_millis(750));
        assert!(config.include_subdirectories);
        assert!(config.target().is_none());
    }

    #[test]
    fn test_merge_is_partial() {
        let mut config = TargetConfig::default();
        config.merge(&ConfigDelta {
            target_id: Some("alpha".into()),
            refresh_interval_ms: Some(500),
            include_subdirectories: Some(false),
            target_exists: None,
        });

        // Only the interval is provided; everything else stays.
        let changed = config.merge(&ConfigDelta {
            refresh_interval_ms: Some(1200),
            ..Default::default()
        });

        assert!(!changed);
        assert_eq!(config.target_id.as_deref(), Some("alpha"));
        assert_eq!(config.refresh_interval_ms, 1200);
        assert!(!config.include_subdirectories);
    }

    #[test]
    fn test_explicit_false_is_applied() {
        let mut config = TargetConfig::default();
        config.merge(&ConfigDelta {
            include_subdirectories: Some(false),
            ..Default::default()
        });
        assert!(!config.include_subdirectories);
    }

    #[test]
    fn test_merge_reports_target_change() {
        let mut config = TargetConfig::default();
        let delta = ConfigDelta {
            target_id: Some("alpha".into()),
            ..Default::default()
        };
        assert!(config.merge(&delta));
        assert!(!config.merge(&delta));
        assert!(config.merge(&ConfigDelta {
            target_id: Some("beta".into()),
            ..Default::default()
        }));
    }

    #[test]
    fn test_target_carries_scope() {
        let config = TargetConfig {
            target_id: Some("alpha".into()),
            refresh_interval_ms: 100,
            include_subdirectories: false,
        };
        assert_eq!(config.target(), Some(Target::new("alpha", false)));
    }
}
