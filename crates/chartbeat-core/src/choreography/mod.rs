//! Choreography generation
//!
//! Each [`Style`] is an independent strategy turning the Musical Event Model
//! into a sorted action timeline. Strategies never read the clock and own
//! their catalog cursors, so the same input always produces the same
//! timeline.
//!
//! Cadence rules count beats and onsets by index, not by time: "every 4th
//! beat" is every 4th element of `beats`.

pub mod catalog;
pub mod chaos;
pub mod drawing;
pub mod replay;
pub mod symbol_surf;

use crate::action::{Action, CHART_BASE};
use crate::error::CoreError;
use crate::events::MusicalEvents;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available choreography styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    SymbolSurf,
    Replay,
    Chaos,
    Drawing,
}

impl Style {
    /// All styles in performance order
    pub const ALL: [Style; 4] = [Style::SymbolSurf, Style::Replay, Style::Chaos, Style::Drawing];

    pub fn name(&self) -> &'static str {
        match self {
            Style::SymbolSurf => "symbol_surf",
            Style::Replay => "replay",
            Style::Chaos => "chaos",
            Style::Drawing => "drawing",
        }
    }

    /// File name the style's timeline is persisted under
    pub fn file_name(&self) -> String {
        format!("style_{}.json", self.name())
    }

    /// Generate this style's timeline, sorted by time.
    pub fn generate(&self, events: &MusicalEvents) -> Vec<Action> {
        match self {
            Style::SymbolSurf => symbol_surf::generate(events),
            Style::Replay => replay::generate(events),
            Style::Chaos => chaos::generate(events),
            Style::Drawing => drawing::generate(events),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| CoreError::UnknownStyle(s.to_string()))
    }
}

/// Persisted timeline for one style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub style: Style,
    pub bpm: f64,
    pub duration: f64,
    pub action_count: usize,
    pub actions: Vec<Action>,
}

impl TimelineDocument {
    /// Generate a style and wrap it with the clip's tempo and duration
    pub fn generate(style: Style, events: &MusicalEvents) -> Self {
        let actions = style.generate(events);
        Self {
            style,
            bpm: events.bpm,
            duration: events.duration,
            action_count: actions.len(),
            actions,
        }
    }
}

/// Full controller path for a chart endpoint
pub(crate) fn chart_path(endpoint: &str) -> String {
    format!("{}/{}", CHART_BASE, endpoint)
}
