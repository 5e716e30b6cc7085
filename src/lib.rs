//! # nebula-live
//!
//! A live preview monitor for Nebula render projects.
//!
//! A preview watches one project. Once the host tells it which project to
//! follow, it polls the project's `live_info` endpoint at a fixed period and,
//! whenever the latest image's modification time changes, points the display
//! at a fresh `live_image` URL. Polling can be paused and resumed, and the
//! latest image can be opened outside the terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐  commands  ┌──────────────────────────────────┐ │
//! │  │  app    │───────────▶│ preview::PreviewDriver (task)    │ │
//! │  │ (state) │◀───────────│   PreviewController              │ │
//! │  └────┬────┘ PreviewView│   ├ TargetConfig  ├ PollScheduler│ │
//! │       │     (watch)     │   ├ ChangeDetector├ DisplayState │ │
//! │       ▼                 └───────────────┬──────────────────┘ │
//! │  ┌─────────┐                            ▼                    │
//! │  │   ui    │                      ┌───────────┐              │
//! │  │(ratatui)│                      │  source   │◀── HttpSource│
//! │  └─────────┘                      │ (probing) │              │
//! │                                   └───────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`preview`]**: the polling state machine ([`PreviewController`]) and
//!   the task that drives it ([`PreviewDriver`])
//! - **[`source`]**: remote store abstraction ([`LiveSource`] trait) with the
//!   HTTP implementation
//! - **[`data`]**: frame history and duration helpers
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal surface
//! - **[`settings`]**, **[`logging`]**: configuration layers and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Follow a project on the default local endpoint
//! nebula-live --project my-project
//!
//! # Replay a host execution result, log instead of drawing
//! nebula-live --message result.json --headless
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use nebula_live::{HttpSource, PreviewController, PreviewDriver};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder()
//!     .endpoint("http://127.0.0.1:8188/nebula")
//!     .build()
//!     .unwrap();
//! let (handle, _task) = PreviewDriver::new(PreviewController::new(Box::new(source))).spawn();
//!
//! handle
//!     .deliver(json!({ "ui": { "nebula_live_project_id": ["my-project"] } }))
//!     .await
//!     .unwrap();
//!
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{}", updates.borrow().display.status_text);
//! }
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod logging;
pub mod preview;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Opener, SystemOpener};
pub use data::{FrameHistory, FrameRecord};
pub use preview::{
    Arming, Command, HostUpdate, PreviewController, PreviewDriver, PreviewHandle, PreviewView,
    SchedulerState, TickReport,
};
pub use settings::Settings;
pub use source::{HttpSource, LiveSource, ProbeError, Snapshot, Target};
