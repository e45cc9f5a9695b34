//! Live performances
//!
//! A performance loads one persisted style timeline, readies the chart,
//! resolves drawing coordinates against what the chart is showing, then
//! starts the audio clip and the scheduler at the same instant.

use crate::error::{ControlError, Result};
use crate::playback::{Playback, Player};
use crate::scheduler::{wait_out, Dispatch, ExecutionReport, Scheduler};
use async_trait::async_trait;
use chartbeat_core::{
    resolve_timeline, timeline_has_placeholders, Action, AppConfig, ChartBounds, PerformConfig,
    Style,
};
use chartbeat_io::load_timeline;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// Chart controller operations a performance needs
#[async_trait]
pub trait ChartController: Dispatch {
    async fn health(&self) -> Result<()>;
    async fn discover_chart_id(&self) -> Result<String>;
    async fn fetch_bounds(&self, chart_id: &str) -> Result<ChartBounds>;
    async fn prep_chart(&self, chart_id: &str, settle: Duration);
}

/// Result of a completed performance
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOutcome {
    pub style: Style,
    pub chart_id: String,
    pub report: ExecutionReport,
}

/// Runs style timelines against a controller
pub struct Performer<C, P> {
    controller: C,
    player: P,
    settings: PerformConfig,
    output_dir: PathBuf,
    clip_path: PathBuf,
    scheduler: Scheduler,
    rng: StdRng,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<C: ChartController, P: Player> Performer<C, P> {
    pub fn new(controller: C, player: P, config: &AppConfig) -> Self {
        Self {
            controller,
            player,
            settings: config.perform.clone(),
            output_dir: config.output_dir.clone(),
            clip_path: config.clip_path(),
            scheduler: Scheduler::new(config.perform.progress_every),
            rng: StdRng::from_os_rng(),
            shutdown: None,
        }
    }

    /// Use a fixed seed for placeholder resolution
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Stop the running performance (and skip the rest) once the channel
    /// reads `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    fn stop_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Perform one style from its persisted timeline.
    pub async fn perform_style(&mut self, style: Style) -> Result<StyleOutcome> {
        let timeline_path = self.output_dir.join(style.file_name());
        if !timeline_path.exists() {
            return Err(ControlError::InputMissing(timeline_path));
        }
        if !self.clip_path.exists() {
            return Err(ControlError::InputMissing(self.clip_path.clone()));
        }
        let document = load_timeline(&timeline_path)?;

        let chart_id = self.controller.discover_chart_id().await?;
        let mut actions: Vec<Action> = document
            .actions
            .into_iter()
            .map(|a| a.with_chart_id(&chart_id))
            .collect();

        info!(
            "PERFORMING: {} ({} actions, {:.0}s)",
            style,
            actions.len(),
            document.duration
        );

        self.controller.health().await?;
        self.controller
            .prep_chart(&chart_id, self.settings.prep_settle())
            .await;

        if timeline_has_placeholders(&actions) {
            let bounds = self.controller.fetch_bounds(&chart_id).await?;
            actions = resolve_timeline(&actions, &bounds, &mut self.rng)?;
        }

        let playback = self.player.start(&self.clip_path).await?;
        let start = Instant::now();
        info!("Executing {} actions", actions.len());

        let report = self
            .scheduler
            .run_until(
                &self.controller,
                &actions,
                start,
                shutdown_signal(self.shutdown.clone()),
            )
            .await;

        if !report.cancelled {
            tokio::select! {
                _ = wait_out(start, document.duration, self.settings.trailing_buffer()) => {}
                _ = shutdown_signal(self.shutdown.clone()) => info!("Stopping early"),
            }
        }

        if let Err(e) = playback.stop().await {
            warn!("Failed to stop audio player: {}", e);
        }

        info!(
            "Performance of {} complete: {} dispatched, {} failed",
            style, report.dispatched, report.failed
        );
        Ok(StyleOutcome {
            style,
            chart_id,
            report,
        })
    }

    /// Perform styles one after another. A failed style does not stop the
    /// run; a shutdown request does.
    pub async fn perform_styles(&mut self, styles: &[Style]) -> Vec<(Style, Result<StyleOutcome>)> {
        let mut results = Vec::with_capacity(styles.len());
        for (i, &style) in styles.iter().enumerate() {
            if self.stop_requested() {
                warn!("Shutdown requested, skipping {}", style);
                break;
            }
            if i > 0 {
                info!("Pausing {:.0}s before next style", self.settings.style_pause_secs);
                tokio::select! {
                    _ = sleep(self.settings.style_pause()) => {}
                    _ = shutdown_signal(self.shutdown.clone()) => break,
                }
            }

            let result = self.perform_style(style).await;
            match &result {
                Ok(_) => info!("DONE: {}", style),
                Err(e) => error!("FAILED: {}: {}", style, e),
            }
            results.push((style, result));
        }
        results
    }
}

/// Resolves once shutdown is requested; never without a channel
async fn shutdown_signal(shutdown: Option<watch::Receiver<bool>>) {
    if let Some(mut rx) = shutdown {
        if rx.wait_for(|stop| *stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
