//! User-visible preview state and status texts.

use chrono::{DateTime, Local};

use crate::source::{ChangeToken, Snapshot};

pub const WAITING_STATUS: &str = "Waiting for project id…";
pub const UNEXPECTED_FAILURE_STATUS: &str = "Preview error (see log)";

/// Everything the surface shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Source of the displayed image.
    pub image_url: Option<String>,
    pub status_text: String,
    /// Incremented on every image update.
    pub image_revision: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            image_url: None,
            status_text: WAITING_STATUS.to_string(),
            image_revision: 0,
        }
    }
}

impl DisplayState {
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
    }

    pub fn set_image(&mut self, url: String) {
        self.image_url = Some(url);
        self.image_revision += 1;
    }
}

pub fn armed_status(target_id: &str, target_exists: Option<bool>) -> String {
    match target_exists {
        Some(false) => format!(
            "Live preview armed (project: {}, folder not found)",
            target_id
        ),
        _ => format!("Live preview armed (project: {})", target_id),
    }
}

pub fn no_images_status(target_id: &str) -> String {
    format!("No images yet (project: {})", target_id)
}

pub fn transport_error_status(code: u16) -> String {
    format!("Preview info error ({})", code)
}

/// `<name> • loop: <group> • <time>` for an existing artifact.
pub fn frame_status(snapshot: &Snapshot) -> String {
    let name = snapshot.display_name.as_deref().unwrap_or("latest");
    let time = format_token_time(snapshot.change_token);

    match snapshot.group_label.as_deref() {
        Some(group) => format!("{} • loop: {} • {}", name, group, time),
        None => format!("{} • {}", name, time),
    }
}

/// Local wall-clock time of a modification-time token.
pub fn format_token_time(token: Option<ChangeToken>) -> String {
    let secs = token.map(|t| t.as_secs()).unwrap_or(0.0);
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;

    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_waiting() {
        let display = DisplayState::default();
        assert_eq!(display.status_text, WAITING_STATUS);
        assert!(display.image_url.is_none());
        assert_eq!(display.image_revision, 0);
    }

    #[test]
    fn test_set_image_bumps_revision() {
        let mut display = DisplayState::default();
        display.set_image("http://x/live_image?t=1".into());
        display.set_image("http://x/live_image?t=2".into());
        assert_eq!(display.image_revision, 2);
        assert_eq!(display.image_url.as_deref(), Some("http://x/live_image?t=2"));
    }

    #[test]
    fn test_frame_status_with_loop() {
        let snapshot = Snapshot::present(1000.0).named("a.png").in_group("loop_02");
        let status = frame_status(&snapshot);
        assert!(status.starts_with("a.png • loop: loop_02 • "));
        assert_eq!(status.matches(':').count(), 3);
    }

    #[test]
    fn test_frame_status_defaults() {
        let status = frame_status(&Snapshot::present(1000.0));
        assert!(status.starts_with("latest • "));
        assert!(!status.contains("loop:"));
    }

    #[test]
    fn test_format_token_time_shape() {
        let time = format_token_time(Some(ChangeToken::from_secs(1_718_000_000.5)));
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn test_armed_status() {
        assert_eq!(
            armed_status("alpha", None),
            "Live preview armed (project: alpha)"
        );
        assert_eq!(
            armed_status("alpha", Some(true)),
            "Live preview armed (project: alpha)"
        );
        assert_eq!(
            armed_status("alpha", Some(false)),
            "Live preview armed (project: alpha, folder not found)"
        );
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(no_images_status("p"), "No images yet (project: p)");
        assert_eq!(transport_error_status(502), "Preview info error (502)");
    }
}
