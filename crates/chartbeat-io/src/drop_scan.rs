//! Drop search across a music library
//!
//! Every `*.mp4` in the music directory is decoded to a temporary mono WAV,
//! reduced to a 1-second RMS signal and scored with the drop windower. The
//! best window over all tracks becomes the performance clip.

use crate::documents::ClipMetadata;
use crate::error::{IoError, Result};
use crate::media::Ffmpeg;
use crate::wav::{read_mono_wav, MonoSignal};
use chartbeat_core::{find_best_window, rms_frames, DropWindow};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Best window found in one track
#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate {
    pub source: PathBuf,
    pub window: DropWindow,
}

impl DropCandidate {
    pub fn metadata(&self, duration_secs: u32) -> ClipMetadata {
        ClipMetadata {
            source_file: self.source.clone(),
            start_sec: self.window.start_time,
            duration_sec: duration_secs as f64,
            score: self.window.score,
        }
    }
}

/// Sorted list of `*.mp4` files in `dir`
pub fn list_videos(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IoError::InputMissing(dir.to_path_buf()));
    }
    let mut videos: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
        })
        .collect();
    videos.sort();
    Ok(videos)
}

/// Highest-scoring usable candidate. The first one wins a tie.
pub fn pick_best(candidates: impl IntoIterator<Item = DropCandidate>) -> Option<DropCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.window.is_usable())
        .fold(None, |best: Option<DropCandidate>, candidate| match best {
            Some(b) if b.window.score >= candidate.window.score => Some(b),
            _ => Some(candidate),
        })
}

/// Best `clip_secs` window of a decoded track.
///
/// A track with fewer samples than one full clip has no window, even when
/// its partial last second would round the frame count up to the clip length.
pub fn best_window(signal: &MonoSignal, clip_secs: u32) -> DropWindow {
    let clip_samples = clip_secs as usize * signal.sample_rate as usize;
    if signal.samples.len() < clip_samples {
        return DropWindow::default();
    }
    let energy = rms_frames(&signal.samples, signal.sample_rate as usize);
    find_best_window(&energy, clip_secs as usize)
}

/// Scans a music directory for the most dramatic window
pub struct DropScanner {
    ffmpeg: Ffmpeg,
    clip_secs: u32,
    scan_limit_secs: u32,
}

impl DropScanner {
    pub fn new(ffmpeg: Ffmpeg, clip_secs: u32, scan_limit_secs: u32) -> Self {
        Self {
            ffmpeg,
            clip_secs,
            scan_limit_secs,
        }
    }

    /// Best window of a single track
    pub fn scan_track(&self, video: &Path) -> Result<DropWindow> {
        let scratch = tempfile::Builder::new()
            .prefix("chartbeat_scan_")
            .suffix(".wav")
            .tempfile()?;
        self.ffmpeg
            .extract_wav(video, scratch.path(), self.scan_limit_secs)?;

        let signal = read_mono_wav(scratch.path())?;
        Ok(best_window(&signal, self.clip_secs))
    }

    /// Scan every video in `dir`. Tracks that fail to decode are skipped.
    pub fn scan_dir(&self, dir: &Path) -> Result<DropCandidate> {
        let videos = list_videos(dir)?;
        if videos.is_empty() {
            return Err(IoError::InputMissing(dir.to_path_buf()));
        }
        info!("Scanning {} tracks in {:?}", videos.len(), dir);

        let candidates = videos.iter().filter_map(|video| match self.scan_track(video) {
            Ok(window) => {
                info!(
                    "{:?}: best window at {:.0}s (score {:.4})",
                    video.file_name().unwrap_or_default(),
                    window.start_time,
                    window.score
                );
                Some(DropCandidate {
                    source: video.clone(),
                    window,
                })
            }
            Err(e) => {
                warn!("Skipping {:?}: {}", video, e);
                None
            }
        });

        pick_best(candidates).ok_or(IoError::NoUsableWindow(videos.len()))
    }
}
