//! Application configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Loaded from TOML.

use crate::error::{CoreError, Result};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where clips, event models and timelines are written
    pub output_dir: PathBuf,
    /// Directory scanned for source videos
    pub music_dir: PathBuf,
    /// Length of the extracted drop clip
    pub clip_duration_secs: u32,
    /// Only this much of each source track is scanned
    pub scan_limit_secs: u32,
    pub controller: ControllerConfig,
    pub perform: PerformConfig,
    pub logging: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            music_dir: PathBuf::from("music"),
            clip_duration_secs: 60,
            scan_limit_secs: 600,
            controller: ControllerConfig::default(),
            perform: PerformConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.perform.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn clip_path(&self) -> PathBuf {
        self.output_dir.join("clip.mp3")
    }

    pub fn clip_meta_path(&self) -> PathBuf {
        self.output_dir.join("clip_meta.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.output_dir.join("beats.json")
    }

    pub fn timeline_path(&self, style_file: &str) -> PathBuf {
        self.output_dir.join(style_file)
    }
}

/// Chart controller connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ControllerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Performance timing and the audio player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformConfig {
    /// Extra wait after the clip ends before teardown
    pub trailing_buffer_secs: f64,
    /// Pause between styles in a multi-style run
    pub style_pause_secs: f64,
    /// Pause after chart prep so the controller settles
    pub prep_settle_secs: f64,
    /// Log progress every N dispatched actions
    pub progress_every: usize,
    pub player_program: String,
    /// Arguments placed before the clip path
    pub player_args: Vec<String>,
}

impl Default for PerformConfig {
    fn default() -> Self {
        Self {
            trailing_buffer_secs: 3.0,
            style_pause_secs: 5.0,
            prep_settle_secs: 1.0,
            progress_every: 20,
            player_program: "ffplay".to_string(),
            player_args: vec!["-nodisp".to_string(), "-autoexit".to_string()],
        }
    }
}

impl PerformConfig {
    /// Every wait must be a finite, non-negative number of seconds that
    /// fits a `Duration`.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("trailing_buffer_secs", self.trailing_buffer_secs),
            ("style_pause_secs", self.style_pause_secs),
            ("prep_settle_secs", self.prep_settle_secs),
        ] {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(CoreError::InvalidConfig(format!(
                    "perform.{} = {} is not a usable duration",
                    name, secs
                )));
            }
        }
        Ok(())
    }

    pub fn trailing_buffer(&self) -> Duration {
        seconds(self.trailing_buffer_secs)
    }

    pub fn style_pause(&self) -> Duration {
        seconds(self.style_pause_secs)
    }

    pub fn prep_settle(&self) -> Duration {
        seconds(self.prep_settle_secs)
    }
}

/// Unvalidated values fall back to no wait
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
