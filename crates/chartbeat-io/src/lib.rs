//! Chartbeat IO - Media and Persisted Documents
//!
//! - `ffmpeg` wrappers for scan audio and the performance clip
//! - WAV decoding
//! - Drop search across a music library
//! - JSON documents exchanged between pipeline stages

pub mod documents;
pub mod drop_scan;
pub mod error;
pub mod media;
pub mod wav;

pub use documents::{
    load_clip_metadata, load_events, load_features, load_json, load_timeline, save_json,
    ClipMetadata, MAX_DOCUMENT_SIZE,
};
pub use drop_scan::{best_window, list_videos, pick_best, DropCandidate, DropScanner};
pub use error::{IoError, Result};
pub use media::Ffmpeg;
pub use wav::{read_mono_wav, MonoSignal};
