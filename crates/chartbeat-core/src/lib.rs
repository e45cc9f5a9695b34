//! Chartbeat Core - Event Model and Choreography
//!
//! This crate contains everything that can be computed without touching the
//! live chart controller:
//! - Musical Event Model shared by the analysis and choreography stages
//! - Drop window search over a 1-second energy signal
//! - Section segmentation of the energy curve
//! - Alignment of raw analysis output to beats and onsets
//! - The four choreography styles
//! - Placeholder resolution against live chart bounds
//! - Configuration and logging settings

#![allow(missing_docs)]

pub mod action;
pub mod choreography;
pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod logging;
pub mod placeholder;
pub mod sections;
pub mod windower;

// --- Re-exports grouped by category ---

// Event model
pub use events::{Beat, EnergySample, MusicalEvents, Onset, Section, SectionKind};
pub use features::{build_event_model, AudioFeatures, Envelope};

// Timelines
pub use action::{is_sorted, sort_timeline, Action, HttpMethod, CHART_BASE};
pub use choreography::{Style, TimelineDocument};
pub use placeholder::{resolve_timeline, timeline_has_placeholders, ChartBounds};

// Analysis
pub use sections::segment;
pub use windower::{find_best_window, rms_frames, DropWindow};

// Settings
pub use config::{AppConfig, ControllerConfig, PerformConfig};
pub use error::{CoreError, Result};
pub use logging::LogConfig;
