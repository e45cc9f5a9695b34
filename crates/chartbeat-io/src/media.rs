//! Media extraction through the external `ffmpeg` tool
//!
//! Two jobs: pull a mono 22.05 kHz PCM WAV out of a source video for energy
//! scanning, and cut the chosen drop section as an MP3 clip.

use crate::error::{IoError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Sample rate of scan WAVs
pub const SCAN_SAMPLE_RATE: u32 = 22_050;

/// Longest stderr excerpt carried into an error
const STDERR_EXCERPT: usize = 400;

/// Handle to the ffmpeg executable
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: OsString,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for a mono PCM scan of the first `limit_secs` of `video`
    pub fn wav_args(video: &Path, wav: &Path, limit_secs: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), video.into()];
        args.extend(
            [
                "-t".to_string(),
                limit_secs.to_string(),
                "-vn".to_string(),
                "-ac".to_string(),
                "1".to_string(),
                "-ar".to_string(),
                SCAN_SAMPLE_RATE.to_string(),
                "-acodec".to_string(),
                "pcm_s16le".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(wav.into());
        args
    }

    /// Arguments for an MP3 cut of `duration_secs` starting at `start_secs`
    pub fn clip_args(video: &Path, start_secs: f64, duration_secs: u32, clip: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-y".to_string(),
            "-ss".to_string(),
            start_secs.to_string(),
            "-t".to_string(),
            duration_secs.to_string(),
            "-i".to_string(),
        ]
        .map(OsString::from)
        .into();
        args.push(video.into());
        args.extend(["-vn", "-acodec", "libmp3lame", "-q:a", "2"].map(OsString::from));
        args.push(clip.into());
        args
    }

    pub fn extract_wav(&self, video: &Path, wav: &Path, limit_secs: u32) -> Result<()> {
        debug!("Extracting scan audio from {:?}", video);
        self.run(Self::wav_args(video, wav, limit_secs))
    }

    pub fn extract_clip(
        &self,
        video: &Path,
        start_secs: f64,
        duration_secs: u32,
        clip: &Path,
    ) -> Result<()> {
        info!(
            "Cutting {}s clip at {:.0}s from {:?} to {:?}",
            duration_secs, start_secs, video, clip
        );
        if let Some(parent) = clip.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.run(Self::clip_args(video, start_secs, duration_secs, clip))
    }

    fn run(&self, args: Vec<OsString>) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                IoError::MediaTool(format!("failed to start {:?}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr
                .chars()
                .rev()
                .take(STDERR_EXCERPT)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return Err(IoError::MediaTool(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                excerpt.trim()
            )));
        }
        Ok(())
    }
}
