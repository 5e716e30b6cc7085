//! Supporting data helpers.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "750ms", "1s")
//! - [`history`]: Recently displayed frames for the history list and frame-rate readout

pub mod duration;
pub mod history;

pub use history::{FrameHistory, FrameRecord};
