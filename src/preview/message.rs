//! Decoding of host "execution result" messages.
//!
//! The host delivers a loosely structured JSON payload whenever the preview
//! node runs. Fields live under `ui` (or `output.ui`), each wrapped in a
//! one-element array, and any of them may be missing:
//!
//! ```json
//! { "ui": {
//!     "nebula_live_project_id": ["my-project"],
//!     "nebula_live_refresh_ms": [750],
//!     "nebula_live_include_subdirs": [true],
//!     "nebula_live_exists": [true]
//! } }
//! ```
//!
//! [`HostUpdate::from_message`] turns that into a typed [`ConfigDelta`] so an
//! explicit `false` is never confused with "not provided".

use std::path::Path;

use serde_json::{json, Map, Value};

use super::config::{ConfigDelta, DEFAULT_REFRESH_MS};

pub const ERROR_KEY: &str = "nebula_live_error";
pub const PROJECT_ID_KEY: &str = "nebula_live_project_id";
pub const REFRESH_MS_KEY: &str = "nebula_live_refresh_ms";
pub const INCLUDE_SUBDIRS_KEY: &str = "nebula_live_include_subdirs";
pub const EXISTS_KEY: &str = "nebula_live_exists";

/// Bounds the producing node enforces on its refresh input.
pub const MIN_NODE_REFRESH_MS: u64 = 100;
pub const MAX_NODE_REFRESH_MS: u64 = 10_000;

/// A decoded host message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostUpdate {
    /// Error reported upstream. When set, the delta must not arm polling.
    pub error: Option<String>,
    pub delta: ConfigDelta,
}

impl HostUpdate {
    /// Decode a host message. Returns `None` when it carries no `ui` block.
    pub fn from_message(message: &Value) -> Option<Self> {
        let ui = pick_ui(message)?;

        Some(Self {
            error: field(ui, ERROR_KEY).and_then(text),
            delta: ConfigDelta {
                target_id: field(ui, PROJECT_ID_KEY).and_then(text),
                refresh_interval_ms: field(ui, REFRESH_MS_KEY).and_then(refresh_ms),
                include_subdirectories: field(ui, INCLUDE_SUBDIRS_KEY).map(truthy),
                target_exists: field(ui, EXISTS_KEY).and_then(Value::as_bool),
            },
        })
    }

    /// Encode back into the wire shape.
    pub fn to_message(&self) -> Value {
        let mut ui = Map::new();
        if let Some(ref error) = self.error {
            ui.insert(ERROR_KEY.into(), json!([error]));
        }
        if let Some(ref id) = self.delta.target_id {
            ui.insert(PROJECT_ID_KEY.into(), json!([id]));
        }
        if let Some(ms) = self.delta.refresh_interval_ms {
            ui.insert(REFRESH_MS_KEY.into(), json!([ms]));
        }
        if let Some(include) = self.delta.include_subdirectories {
            ui.insert(INCLUDE_SUBDIRS_KEY.into(), json!([include]));
        }
        if let Some(exists) = self.delta.target_exists {
            ui.insert(EXISTS_KEY.into(), json!([exists]));
        }
        json!({ "ui": ui })
    }
}

/// Inputs of the preview node besides `project_data`.
#[derive(Debug, Clone)]
pub struct NodeInputs<'a> {
    pub refresh_ms: u64,
    pub include_subdirs: bool,
    /// Directory holding one folder per project, if known.
    pub nebula_root: Option<&'a Path>,
}

/// Build the execution result the preview node emits for `project_data`.
///
/// The project id is read from `id`, falling back to `project_id`. Without
/// one the message carries an error instead of a configuration.
pub fn execution_message(project_data: &Value, inputs: &NodeInputs<'_>) -> Value {
    let project_id = project_data
        .as_object()
        .and_then(|data| {
            data.get("id")
                .and_then(text)
                .or_else(|| data.get("project_id").and_then(text))
        });

    let Some(project_id) = project_id else {
        return HostUpdate {
            error: Some("project_data missing 'id' / 'project_id'".to_string()),
            delta: ConfigDelta::default(),
        }
        .to_message();
    };

    let target_exists = inputs
        .nebula_root
        .map(|root| root.join(&project_id).is_dir());

    HostUpdate {
        error: None,
        delta: ConfigDelta {
            target_id: Some(project_id),
            refresh_interval_ms: Some(clamp_node_refresh(inputs.refresh_ms)),
            include_subdirectories: Some(inputs.include_subdirs),
            target_exists,
        },
    }
    .to_message()
}

/// `ui` is preferred; `output.ui` is the fallback location.
fn pick_ui(message: &Value) -> Option<&Map<String, Value>> {
    message
        .get("ui")
        .and_then(Value::as_object)
        .or_else(|| message.get("output")?.get("ui")?.as_object())
}

/// First element of an array field. A bare scalar is taken as-is.
fn field<'a>(ui: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match ui.get(key)? {
        Value::Null => None,
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Only a missing or falsy raw value is absent. A present value that is not
/// a positive number (including the string `"0"`) means the default.
fn refresh_ms(value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(ms) if ms.is_finite() && ms > 0.0 => Some((ms.round() as u64).max(1)),
        _ => Some(DEFAULT_REFRESH_MS),
    }
}

/// Clamp a refresh period to the bounds the producing node accepts.
pub fn clamp_node_refresh(ms: u64) -> u64 {
    ms.clamp(MIN_NODE_REFRESH_MS, MAX_NODE_REFRESH_MS)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_full_message() {
        let message = json!({
            "ui": {
                "nebula_live_project_id": ["alpha"],
                "nebula_live_refresh_ms": [500],
                "nebula_live_include_subdirs": [false],
                "nebula_live_exists": [true]
            }
        });

        let update = HostUpdate::from_message(&message).unwrap();
        assert!(update.error.is_none());
        assert_eq!(
            update.delta,
            ConfigDelta {
                target_id: Some("alpha".into()),
                refresh_interval_ms: Some(500),
                include_subdirectories: Some(false),
                target_exists: Some(true),
            }
        );
    }

    #[test]
    fn test_output_ui_fallback() {
        let message = json!({ "output": { "ui": { "nebula_live_project_id": ["beta"] } } });
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.target_id.as_deref(), Some("beta"));
    }

    #[test]
    fn test_ui_preferred_over_output() {
        let message = json!({
            "ui": { "nebula_live_project_id": ["top"] },
            "output": { "ui": { "nebula_live_project_id": ["nested"] } }
        });
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.target_id.as_deref(), Some("top"));
    }

    #[test]
    fn test_message_without_ui() {
        assert!(HostUpdate::from_message(&json!({ "images": [] })).is_none());
        assert!(HostUpdate::from_message(&json!(null)).is_none());
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let update = HostUpdate::from_message(&json!({ "ui": {} })).unwrap();
        assert!(update.error.is_none());
        assert!(update.delta.is_empty());
    }

    #[test]
    fn test_error_field() {
        let message = json!({ "ui": { "nebula_live_error": ["project_data missing 'id'"] } });
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.error.as_deref(), Some("project_data missing 'id'"));

        let empty = json!({ "ui": { "nebula_live_error": [""] } });
        assert!(HostUpdate::from_message(&empty).unwrap().error.is_none());
    }

    #[test]
    fn test_numeric_project_id() {
        let message = json!({ "ui": { "nebula_live_project_id": [42] } });
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.target_id.as_deref(), Some("42"));

        let empty = json!({ "ui": { "nebula_live_project_id": [""] } });
        assert!(HostUpdate::from_message(&empty).unwrap().delta.target_id.is_none());
    }

    #[test]
    fn test_refresh_decoding() {
        let decode = |v: Value| {
            HostUpdate::from_message(&json!({ "ui": { "nebula_live_refresh_ms": [v] } }))
                .unwrap()
                .delta
                .refresh_interval_ms
        };

        assert_eq!(decode(json!(1200)), Some(1200));
        assert_eq!(decode(json!("300")), Some(300));
        assert_eq!(decode(json!(250.6)), Some(251));
        assert_eq!(decode(json!(0)), None);
        assert_eq!(decode(json!("")), None);
        assert_eq!(decode(json!(null)), None);
        assert_eq!(decode(json!("fast")), Some(DEFAULT_REFRESH_MS));
        assert_eq!(decode(json!(-20)), Some(DEFAULT_REFRESH_MS));
    }

    #[test]
    fn test_zero_string_refresh_uses_default() {
        let decode = |v: Value| {
            HostUpdate::from_message(&json!({ "ui": { "nebula_live_refresh_ms": [v] } }))
                .unwrap()
                .delta
                .refresh_interval_ms
        };

        assert_eq!(decode(json!("0")), Some(DEFAULT_REFRESH_MS));
        assert_eq!(decode(json!(" ")), Some(DEFAULT_REFRESH_MS));
        assert_eq!(decode(json!(0.0)), None);
    }

    #[test]
    fn test_clamp_node_refresh() {
        assert_eq!(clamp_node_refresh(20), MIN_NODE_REFRESH_MS);
        assert_eq!(clamp_node_refresh(750), 750);
        assert_eq!(clamp_node_refresh(60_000), MAX_NODE_REFRESH_MS);
    }

    #[test]
    fn test_include_subdirs_presence() {
        let decode = |ui: Value| {
            HostUpdate::from_message(&json!({ "ui": ui }))
                .unwrap()
                .delta
                .include_subdirectories
        };

        assert_eq!(decode(json!({ "nebula_live_include_subdirs": [false] })), Some(false));
        assert_eq!(decode(json!({ "nebula_live_include_subdirs": [true] })), Some(true));
        assert_eq!(decode(json!({ "nebula_live_include_subdirs": [0] })), Some(false));
        assert_eq!(decode(json!({ "nebula_live_include_subdirs": [null] })), Some(false));
        assert_eq!(decode(json!({ "nebula_live_include_subdirs": [] })), None);
        assert_eq!(decode(json!({})), None);
    }

    #[test]
    fn test_bare_scalar_fields() {
        let message = json!({ "ui": { "nebula_live_project_id": "gamma", "nebula_live_refresh_ms": 900 } });
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.target_id.as_deref(), Some("gamma"));
        assert_eq!(update.delta.refresh_interval_ms, Some(900));
    }

    #[test]
    fn test_to_message_round_trip() {
        let update = HostUpdate {
            error: None,
            delta: ConfigDelta {
                target_id: Some("alpha".into()),
                refresh_interval_ms: None,
                include_subdirectories: Some(false),
                target_exists: None,
            },
        };
        assert_eq!(HostUpdate::from_message(&update.to_message()), Some(update));
    }

    #[test]
    fn test_execution_message_from_project_data() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("alpha")).unwrap();

        let inputs = NodeInputs {
            refresh_ms: 20,
            include_subdirs: true,
            nebula_root: Some(root.path()),
        };

        let message = execution_message(&json!({ "id": "alpha", "name": "Alpha" }), &inputs);
        let update = HostUpdate::from_message(&message).unwrap();
        assert!(update.error.is_none());
        assert_eq!(update.delta.target_id.as_deref(), Some("alpha"));
        assert_eq!(update.delta.refresh_interval_ms, Some(MIN_NODE_REFRESH_MS));
        assert_eq!(update.delta.include_subdirectories, Some(true));
        assert_eq!(update.delta.target_exists, Some(true));

        let message = execution_message(&json!({ "project_id": "beta" }), &inputs);
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.target_id.as_deref(), Some("beta"));
        assert_eq!(update.delta.target_exists, Some(false));
    }

    #[test]
    fn test_execution_message_without_root() {
        let inputs = NodeInputs {
            refresh_ms: 60_000,
            include_subdirs: false,
            nebula_root: None,
        };
        let message = execution_message(&json!({ "id": "alpha" }), &inputs);
        let update = HostUpdate::from_message(&message).unwrap();
        assert_eq!(update.delta.refresh_interval_ms, Some(MAX_NODE_REFRESH_MS));
        assert!(update.delta.target_exists.is_none());
    }

    #[test]
    fn test_execution_message_missing_id() {
        let inputs = NodeInputs {
            refresh_ms: 750,
            include_subdirs: true,
            nebula_root: None,
        };

        for data in [json!({ "name": "x" }), json!("alpha"), json!({ "id": "" })] {
            let message = execution_message(&data, &inputs);
            let update = HostUpdate::from_message(&message).unwrap();
            assert_eq!(
                update.error.as_deref(),
                Some("project_data missing 'id' / 'project_id'")
            );
            assert!(update.delta.is_empty());
        }
    }
}
