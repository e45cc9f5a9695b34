//! Alignment of raw analysis output to the Musical Event Model
//!
//! The external analyzer reports beat and onset instants plus two envelopes
//! sampled at their own rate. Strength and energy for each event are taken
//! from the envelope sample nearest to the event time, normalized by the
//! envelope maximum.

use crate::action::round_to;
use crate::error::{CoreError, Result};
use crate::events::{Beat, EnergySample, MusicalEvents, Onset};
use crate::sections;
use serde::{Deserialize, Serialize};

/// Energy curve is downsampled to roughly this many points
pub const ENERGY_CURVE_POINTS: usize = 600;

/// A scalar envelope with its own timestamps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Envelope {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        Self { times, values }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.times.len() != self.values.len() {
            return Err(CoreError::InvalidFeatures(format!(
                "{} envelope has {} timestamps but {} values",
                name,
                self.times.len(),
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Largest value, or 1.0 when the envelope is empty or silent
    fn normalizer(&self) -> f64 {
        let max = self.values.iter().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    /// Index of the sample closest to `t`. Ties go to the earlier sample.
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        if self.times.is_empty() {
            return None;
        }
        let upper = self.times.partition_point(|&x| x < t);
        if upper == 0 {
            return Some(0);
        }
        if upper == self.times.len() {
            return Some(upper - 1);
        }
        let below = t - self.times[upper - 1];
        let above = self.times[upper] - t;
        if above < below {
            Some(upper)
        } else {
            Some(upper - 1)
        }
    }

    /// Normalized value at the sample nearest to `t`
    fn normalized_at(&self, t: f64, normalizer: f64) -> f64 {
        self.nearest_index(t)
            .map(|i| self.values[i] / normalizer)
            .unwrap_or(0.0)
    }
}

/// Raw analysis output for one clip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Clip length in seconds
    pub duration: f64,
    /// Tempo estimate in BPM
    pub tempo: f64,
    pub beat_times: Vec<f64>,
    pub onset_times: Vec<f64>,
    /// Onset strength envelope
    pub onset_envelope: Envelope,
    /// RMS energy envelope
    pub rms_envelope: Envelope,
}

/// Build the event model from raw analysis output.
pub fn build_event_model(features: &AudioFeatures) -> Result<MusicalEvents> {
    features.onset_envelope.validate("onset")?;
    features.rms_envelope.validate("rms")?;

    let onset_norm = features.onset_envelope.normalizer();
    let rms_norm = features.rms_envelope.normalizer();

    let beats: Vec<Beat> = features
        .beat_times
        .iter()
        .map(|&t| Beat {
            time: round_to(t, 3),
            strength: round_to(features.onset_envelope.normalized_at(t, onset_norm), 3),
            energy: round_to(features.rms_envelope.normalized_at(t, rms_norm), 3),
        })
        .collect();

    let onsets: Vec<Onset> = features
        .onset_times
        .iter()
        .map(|&t| Onset {
            time: round_to(t, 3),
            strength: round_to(features.onset_envelope.normalized_at(t, onset_norm), 3),
        })
        .collect();

    let energy_curve = downsample_energy(&features.rms_envelope, rms_norm);
    let duration = round_to(features.duration, 2);
    let sections = sections::segment(&energy_curve, duration);

    Ok(MusicalEvents::new(
        round_to(features.tempo, 1),
        duration,
        beats,
        onsets,
        energy_curve,
        sections,
    ))
}

fn downsample_energy(envelope: &Envelope, normalizer: f64) -> Vec<EnergySample> {
    let step = (envelope.values.len() / ENERGY_CURVE_POINTS).max(1);
    envelope
        .times
        .iter()
        .zip(&envelope.values)
        .step_by(step)
        .map(|(&t, &v)| EnergySample(round_to(t, 2), round_to(v / normalizer, 3)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> AudioFeatures {
        AudioFeatures {
            duration: 4.004,
            tempo: 174.26,
            beat_times: vec![0.5, 1.49, 3.0],
            onset_times: vec![0.25, 2.0],
            onset_envelope: Envelope::new(vec![0.0, 0.5, 1.0, 1.5, 2.0, 3.0], vec![
                0.0, 2.0, 1.0, 4.0, 3.0, 1.0,
            ]),
            rms_envelope: Envelope::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.1, 0.2, 0.4, 0.8]),
        }
    }

    #[test]
    fn test_nearest_index() {
        let env = Envelope::new(vec![0.0, 1.0, 2.0], vec![0.0; 3]);
        assert_eq!(env.nearest_index(-1.0), Some(0));
        assert_eq!(env.nearest_index(0.4), Some(0));
        assert_eq!(env.nearest_index(0.5), Some(0));
        assert_eq!(env.nearest_index(0.6), Some(1));
        assert_eq!(env.nearest_index(9.0), Some(2));
        assert_eq!(Envelope::default().nearest_index(1.0), None);
    }

    #[test]
    fn test_beats_are_normalized_by_envelope_max() {
        let events = build_event_model(&features()).unwrap();
        assert_eq!(events.bpm, 174.3);
        assert_eq!(events.duration, 4.0);
        assert_eq!(events.beat_count, 3);
        assert_eq!(events.onset_count, 2);

        // 0.5 → onset sample 2.0 / 4.0, rms at 0.0 or 1.0 (tie → earlier) 0.1 / 0.8
        assert_eq!(events.beats[0].strength, 0.5);
        assert_eq!(events.beats[0].energy, 0.125);
        // 1.49 → onset sample at 1.5 (4.0), rms at 1.0 (0.2)
        assert_eq!(events.beats[1].strength, 1.0);
        assert_eq!(events.beats[1].energy, 0.25);
        assert_eq!(events.beats[2].energy, 1.0);

        assert_eq!(events.onsets[1].strength, 0.75);
    }

    #[test]
    fn test_energy_curve_and_sections() {
        let events = build_event_model(&features()).unwrap();
        assert_eq!(events.energy_curve.len(), 4);
        assert_eq!(events.energy_curve[3], EnergySample(3.0, 1.0));
        assert_eq!(events.sections.len(), 1);
        assert_eq!(events.sections[0].end, 4.0);
    }

    #[test]
    fn test_mismatched_envelope_is_rejected() {
        let mut bad = features();
        bad.rms_envelope.values.pop();
        assert!(matches!(
            build_event_model(&bad),
            Err(CoreError::InvalidFeatures(_))
        ));
    }

    #[test]
    fn test_silent_envelopes_do_not_divide_by_zero() {
        let features = AudioFeatures {
            duration: 2.0,
            tempo: 120.0,
            beat_times: vec![1.0],
            onset_times: vec![],
            onset_envelope: Envelope::new(vec![0.0, 1.0], vec![0.0, 0.0]),
            rms_envelope: Envelope::new(vec![0.0, 1.0], vec![0.0, 0.0]),
        };
        let events = build_event_model(&features).unwrap();
        assert_eq!(events.beats[0].strength, 0.0);
        assert_eq!(events.beats[0].energy, 0.0);
    }
}
