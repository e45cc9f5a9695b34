//! Section segmentation
//!
//! Splits a clip into fixed 8-second spans, classifies each span against the
//! global energy statistics and merges neighbours of the same class.

use crate::action::round_to;
use crate::events::{EnergySample, Section, SectionKind};

/// Span length in seconds
pub const SPAN_SECONDS: f64 = 8.0;

/// Relative tolerance under which σ counts as zero and a span mean counts
/// as sitting on μ. Summation error on a constant curve is a few ulps.
const FLAT_TOLERANCE: f64 = 1e-9;

/// Global energy statistics used as classification thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyStats {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl EnergyStats {
    pub fn from_curve(curve: &[EnergySample]) -> Option<Self> {
        if curve.is_empty() {
            return None;
        }
        let n = curve.len() as f64;
        let mean = curve.iter().map(EnergySample::value).sum::<f64>() / n;
        let variance = curve
            .iter()
            .map(|s| (s.value() - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Classify a span mean.
    ///
    /// `> μ+σ` drop, `(μ, μ+σ]` high, `(μ-0.5σ, μ]` mid, else buildup. On a
    /// flat curve (σ ≈ 0) the mid band is empty, so a span sitting on the
    /// mean is called mid. Rounding noise in σ and in the span mean is
    /// snapped away before the strict comparisons.
    pub fn classify(&self, value: f64) -> SectionKind {
        let mu = self.mean;
        let tolerance = FLAT_TOLERANCE * mu.abs().max(1.0);
        let sigma = if self.std_dev <= tolerance {
            0.0
        } else {
            self.std_dev
        };
        let value = if (value - mu).abs() <= tolerance { mu } else { value };

        if value > mu + sigma {
            SectionKind::Drop
        } else if value > mu {
            SectionKind::High
        } else if value > mu - 0.5 * sigma || (sigma == 0.0 && value == mu) {
            SectionKind::Mid
        } else {
            SectionKind::Buildup
        }
    }
}

/// Partition `[0, duration]` into classified, merged sections.
///
/// An empty curve (or non-positive duration) yields no sections. A span
/// without samples scores 0.0.
pub fn segment(curve: &[EnergySample], duration: f64) -> Vec<Section> {
    let Some(stats) = EnergyStats::from_curve(curve) else {
        return Vec::new();
    };
    if duration <= 0.0 {
        return Vec::new();
    }

    let mut merged: Vec<Section> = Vec::new();
    let mut index = 0usize;
    loop {
        let start = index as f64 * SPAN_SECONDS;
        if start >= duration {
            break;
        }
        let end = (start + SPAN_SECONDS).min(duration);
        let kind = stats.classify(span_mean(curve, start, end));
        let (start, end) = (round_to(start, 2), round_to(end, 2));

        match merged.last_mut() {
            Some(last) if last.kind == kind => last.end = end,
            _ => merged.push(Section { start, end, kind }),
        }
        index += 1;
    }
    merged
}

fn span_mean(curve: &[EnergySample], start: f64, end: f64) -> f64 {
    let (sum, count) = curve
        .iter()
        .filter(|s| s.time() >= start && s.time() < end)
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.value(), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
