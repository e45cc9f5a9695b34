//! Persisted JSON documents
//!
//! Stages hand work to each other through files in the output directory:
//! `clip_meta.json`, `beats.json` and one `style_<name>.json` per style.
//! A missing file means the producing stage has not run yet and is reported
//! as [`IoError::InputMissing`].

use crate::error::{IoError, Result};
use chartbeat_core::{AudioFeatures, MusicalEvents, TimelineDocument};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum allowed document size (50 MB).
pub const MAX_DOCUMENT_SIZE: u64 = 50 * 1024 * 1024;

/// Where the selected drop clip came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub source_file: PathBuf,
    pub start_sec: f64,
    pub duration_sec: f64,
    pub score: f64,
}

/// Read and deserialize a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    load_json_with_limit(path, MAX_DOCUMENT_SIZE)
}

fn load_json_with_limit<T: DeserializeOwned>(path: &Path, limit: u64) -> Result<T> {
    if !path.exists() {
        return Err(IoError::InputMissing(path.to_path_buf()));
    }
    let size = std::fs::metadata(path)?.len();
    if size > limit {
        return Err(IoError::FileTooLarge { size, limit });
    }

    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;
    let value = serde_json::from_str(&content)?;
    debug!("Loaded {:?} ({} bytes)", path, size);
    Ok(value)
}

/// Serialize a document as pretty JSON, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    debug!("Saved {:?}", path);
    Ok(())
}

pub fn load_events(path: &Path) -> Result<MusicalEvents> {
    load_json(path)
}

pub fn load_features(path: &Path) -> Result<AudioFeatures> {
    load_json(path)
}

pub fn load_timeline(path: &Path) -> Result<TimelineDocument> {
    load_json(path)
}

pub fn load_clip_metadata(path: &Path) -> Result<ClipMetadata> {
    load_json(path)
}
