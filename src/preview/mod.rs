//! The live preview state machine.
//!
//! ## Submodules
//!
//! - [`config`]: target configuration and partial updates ([`TargetConfig`], [`ConfigDelta`])
//! - [`message`]: decoding of host execution-result messages ([`HostUpdate`])
//! - [`detector`]: change detection over modification-time tokens ([`ChangeDetector`])
//! - [`scheduler`]: the repeating poll timer with pause support ([`PollScheduler`])
//! - [`display`]: user-visible state and status texts ([`DisplayState`])
//! - [`controller`]: the orchestrating state machine ([`PreviewController`])
//! - [`driver`]: the event loop task and its handle ([`PreviewDriver`], [`PreviewHandle`])
//!
//! ## Data Flow
//!
//! ```text
//! host message ──▶ HostUpdate ──▶ TargetConfig::merge ──▶ PollScheduler::configure
//!                                                               │ tick
//!                                                               ▼
//!                     DisplayState ◀── ChangeDetector ◀── LiveSource::probe
//! ```

pub mod config;
pub mod controller;
pub mod detector;
pub mod display;
pub mod driver;
pub mod message;
pub mod scheduler;

pub use config::{ConfigDelta, TargetConfig, DEFAULT_REFRESH_MS};
pub use controller::{Arming, PreviewController, TickReport, TickTicket};
pub use detector::{ChangeDetector, Observation};
pub use display::DisplayState;
pub use driver::{Command, PreviewDriver, PreviewHandle, PreviewView};
pub use message::{clamp_node_refresh, execution_message, HostUpdate, NodeInputs};
pub use scheduler::{PollScheduler, SchedulerState};
