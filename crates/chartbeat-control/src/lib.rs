//! Chartbeat Control - Live Chart Performances
//!
//! This crate drives a running chart controller over HTTP:
//! - Controller client (health, chart discovery, bounds, dispatch)
//! - Real-time scheduler replaying an action timeline
//! - Audio clip playback in an external player
//! - Performer tying the pieces together per style

pub mod client;
pub mod error;
pub mod performer;
pub mod playback;
pub mod scheduler;

pub use client::{parse_title_price, ControllerClient};
pub use error::{ControlError, Result};
pub use performer::{ChartController, Performer, StyleOutcome};
pub use playback::{Playback, Player, ProcessPlayer};
pub use scheduler::{wait_out, Dispatch, ExecutionReport, Scheduler};
