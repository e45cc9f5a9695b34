//! Logging configuration
//!
//! Describes where logs go. The binary installs the actual subscriber; this
//! module only owns the settings and the log directory housekeeping.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::level_filters::LevelFilter;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name: trace, debug, info, warn, error
    pub level: String,
    /// Write logs to stderr
    pub console_output: bool,
    /// Also write logs to a file in `log_dir`
    pub file_output: bool,
    pub log_dir: PathBuf,
    /// Number of log files kept after cleanup
    pub max_files: usize,
    #[serde(skip)]
    session_stamp: Option<u64>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            max_files: 10,
            session_stamp: None,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }

    /// Log file for this run
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = self.session_stamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
        self.log_dir.join(format!("chartbeat_{}.log", stamp))
    }

    /// Pin the run stamp so repeated `current_log_path` calls agree
    pub fn with_session_stamp(mut self, stamp: u64) -> Self {
        self.session_stamp = Some(stamp);
        self
    }

    /// Delete the oldest `chartbeat_*.log` files beyond `max_files`.
    /// Returns how many files were removed.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_dir.exists() {
            return Ok(0);
        }
        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();
        if logs.len() <= self.max_files {
            return Ok(0);
        }
        // Stamps sort chronologically by name
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("chartbeat_") && n.ends_with(".log"))
}
