//! Drop window search
//!
//! Scores every fixed-length window of a 1-second energy signal and picks
//! the most dramatic one. Variance rewards a quiet to loud transition; the
//! peak and mean terms keep a short transition inside a loud track from
//! beating a window that is loud throughout.

use serde::{Deserialize, Serialize};

/// Weight of the window variance in the score
pub const VARIANCE_WEIGHT: f64 = 10.0;
/// Weight of the window peak in the score
pub const PEAK_WEIGHT: f64 = 2.0;

/// Best window of a track
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DropWindow {
    /// Window start in whole seconds
    pub start_time: f64,
    /// Relative ranking score, not meaningful on its own
    pub score: f64,
}

impl DropWindow {
    /// A zero or negative score means no usable window was found
    pub fn is_usable(&self) -> bool {
        self.score > 0.0
    }
}

/// Score a single window: `10·variance + 2·max + mean`.
pub fn score_window(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let peak = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    VARIANCE_WEIGHT * variance + PEAK_WEIGHT * peak + mean
}

/// Find the `window`-second span with the highest score.
///
/// Ties go to the earliest window. A signal shorter than the window (or a
/// zero-length window) yields `start_time = 0, score = 0`.
pub fn find_best_window(energy: &[f64], window: usize) -> DropWindow {
    if window == 0 || energy.len() < window {
        return DropWindow::default();
    }

    let mut best = DropWindow {
        start_time: 0.0,
        score: f64::NEG_INFINITY,
    };
    for (start, chunk) in energy.windows(window).enumerate() {
        let score = score_window(chunk);
        if score > best.score {
            best = DropWindow {
                start_time: start as f64,
                score,
            };
        }
    }
    best
}

/// RMS of consecutive non-overlapping frames. A trailing partial frame is
/// kept so the tail of the signal is not dropped.
pub fn rms_frames(samples: &[f32], frame_len: usize) -> Vec<f64> {
    if frame_len == 0 {
        return Vec::new();
    }
    samples
        .chunks(frame_len)
        .map(|frame| {
            let sum_sq: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / frame.len() as f64).sqrt()
        })
        .collect()
}
