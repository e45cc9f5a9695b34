//! Musical Event Model
//!
//! The data contract between the audio analysis stage and everything
//! downstream. It is persisted as `beats.json` and must round-trip through
//! serialization unchanged, so field names follow the persisted layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A detected rhythmic pulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Seconds from clip start
    #[serde(rename = "t")]
    pub time: f64,
    /// Relative onset intensity (0.0 - 1.0)
    pub strength: f64,
    /// Normalized RMS energy at this beat (0.0 - 1.0)
    pub energy: f64,
}

/// A detected transient, denser than beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Onset {
    /// Seconds from clip start
    #[serde(rename = "t")]
    pub time: f64,
    /// Relative onset intensity (0.0 - 1.0)
    pub strength: f64,
}

/// One `[time, value]` sample of the normalized energy curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySample(pub f64, pub f64);

impl EnergySample {
    pub fn time(&self) -> f64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }
}

/// Relative energy class of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Buildup,
    Mid,
    High,
    Drop,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Buildup => "buildup",
            SectionKind::Mid => "mid",
            SectionKind::High => "high",
            SectionKind::Drop => "drop",
        };
        f.write_str(name)
    }
}

/// A contiguous span of the track with a single energy class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: f64,
    pub end: f64,
    #[serde(rename = "type")]
    pub kind: SectionKind,
}

/// Everything the choreography stage knows about a clip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MusicalEvents {
    pub bpm: f64,
    pub duration: f64,
    pub beat_count: usize,
    pub onset_count: usize,
    pub beats: Vec<Beat>,
    pub onsets: Vec<Onset>,
    pub energy_curve: Vec<EnergySample>,
    pub sections: Vec<Section>,
}

impl MusicalEvents {
    /// Build a model, deriving the count fields from the sequences.
    pub fn new(
        bpm: f64,
        duration: f64,
        beats: Vec<Beat>,
        onsets: Vec<Onset>,
        energy_curve: Vec<EnergySample>,
        sections: Vec<Section>,
    ) -> Self {
        Self {
            bpm,
            duration,
            beat_count: beats.len(),
            onset_count: onsets.len(),
            beats,
            onsets,
            energy_curve,
            sections,
        }
    }
}
