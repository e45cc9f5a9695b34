use anyhow::{Context, Result};
use chartbeat_core::{AppConfig, Style};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for clips, event models and timelines (overrides config)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Chart controller base URL (overrides config)
    #[arg(long, global = true)]
    pub controller: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Find the most dramatic window across a music library and cut it
    FindDrop {
        /// Directory of source videos (overrides config)
        #[arg(long)]
        music_dir: Option<PathBuf>,
    },

    /// Align extracted audio features into the musical event model
    Analyze {
        /// Feature extraction output (JSON)
        #[arg(long)]
        features: PathBuf,
    },

    /// Generate every choreography style from the event model
    Choreograph,

    /// Perform one style, or all of them in sequence
    Perform {
        /// symbol_surf, replay, chaos, drawing or all
        #[arg(long)]
        style: StyleSelection,
    },
}

/// Styles requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSelection(pub Vec<Style>);

impl FromStr for StyleSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self(Style::ALL.to_vec()));
        }
        s.parse::<Style>()
            .map(|style| Self(vec![style]))
            .map_err(|e| e.to_string())
    }
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => AppConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(url) = &self.controller {
            config.controller.base_url = url.clone();
        }
        if let Command::FindDrop {
            music_dir: Some(dir),
        } = &self.command
        {
            config.music_dir = dir.clone();
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        config.logging = config.logging.with_session_stamp(stamp);
        Ok(config)
    }
}
