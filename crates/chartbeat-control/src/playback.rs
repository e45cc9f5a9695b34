//! Clip playback in an external player process

use crate::error::{ControlError, Result};
use async_trait::async_trait;
use chartbeat_core::PerformConfig;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Grace period between terminate and kill
pub const STOP_GRACE: Duration = Duration::from_secs(5);

/// Starts playback of a clip
#[async_trait]
pub trait Player: Send + Sync {
    async fn start(&self, clip: &Path) -> Result<Box<dyn Playback>>;
}

/// A running playback
#[async_trait]
pub trait Playback: Send {
    async fn stop(self: Box<Self>) -> Result<()>;
}

/// Player backed by a command such as `ffplay -nodisp -autoexit <clip>`
#[derive(Debug, Clone)]
pub struct ProcessPlayer {
    program: String,
    args: Vec<String>,
}

impl ProcessPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &PerformConfig) -> Self {
        Self::new(config.player_program.clone(), config.player_args.clone())
    }
}

#[async_trait]
impl Player for ProcessPlayer {
    async fn start(&self, clip: &Path) -> Result<Box<dyn Playback>> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ControlError::Player(format!("failed to start {}: {}", self.program, e))
            })?;
        debug!("Started {} (pid {:?})", self.program, child.id());
        Ok(Box::new(ProcessPlayback { child }))
    }
}

struct ProcessPlayback {
    child: Child,
}

#[cfg(unix)]
fn terminate(child: &Child) -> bool {
    let Some(pid) = child.id() else {
        return false;
    };
    std::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn terminate(_child: &Child) -> bool {
    false
}

#[async_trait]
impl Playback for ProcessPlayback {
    async fn stop(self: Box<Self>) -> Result<()> {
        let mut child = self.child;
        if child.try_wait().map_err(player_error)?.is_some() {
            return Ok(());
        }

        if terminate(&child) {
            match tokio::time::timeout(STOP_GRACE, child.wait()).await {
                Ok(status) => {
                    debug!("Player exited with {}", status.map_err(player_error)?);
                    return Ok(());
                }
                Err(_) => warn!("Player ignored terminate, killing"),
            }
        }
        child.kill().await.map_err(player_error)
    }
}

fn player_error(e: std::io::Error) -> ControlError {
    ControlError::Player(e.to_string())
}
