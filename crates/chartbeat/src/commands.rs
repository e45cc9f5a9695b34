//! Pipeline stages behind the subcommands

use anyhow::{bail, Context, Result};
use chartbeat_control::{ControllerClient, Performer, ProcessPlayer};
use chartbeat_core::{build_event_model, AppConfig, Style, TimelineDocument};
use chartbeat_io::{load_events, load_features, save_json, DropScanner, Ffmpeg};
use std::path::Path;
use tokio::sync::watch;
use tracing::{info, warn};

/// Scan the music library, cut the winning window and record where it came from.
pub fn find_drop(config: &AppConfig) -> Result<()> {
    let scanner = DropScanner::new(
        Ffmpeg::default(),
        config.clip_duration_secs,
        config.scan_limit_secs,
    );
    let best = scanner
        .scan_dir(&config.music_dir)
        .with_context(|| format!("No drop found in {:?}", config.music_dir))?;

    println!(
        "WINNER: {} (start {:.0}s, score {:.4})",
        best.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        best.window.start_time,
        best.window.score
    );

    let clip_path = config.clip_path();
    Ffmpeg::default()
        .extract_clip(
            &best.source,
            best.window.start_time,
            config.clip_duration_secs,
            &clip_path,
        )
        .context("Failed to extract clip")?;

    let meta_path = config.clip_meta_path();
    save_json(&best.metadata(config.clip_duration_secs), &meta_path)
        .context("Failed to save clip metadata")?;
    println!("Clip saved: {:?}", clip_path);
    println!("Metadata saved: {:?}", meta_path);
    Ok(())
}

/// Turn feature extraction output into the event model.
pub fn analyze(config: &AppConfig, features_path: &Path) -> Result<()> {
    let features = load_features(features_path)
        .with_context(|| format!("Failed to load features {:?}", features_path))?;
    let events = build_event_model(&features).context("Invalid feature data")?;

    let out_path = config.events_path();
    save_json(&events, &out_path).context("Failed to save event model")?;

    println!("Results saved to {:?}", out_path);
    println!("  BPM: {:.1}", events.bpm);
    println!("  Beats: {}", events.beat_count);
    println!("  Onsets: {}", events.onset_count);
    println!("  Sections: {}", events.sections.len());
    for section in &events.sections {
        println!("    {:.0}s-{:.0}s: {}", section.start, section.end, section.kind);
    }
    Ok(())
}

/// Generate every style. Nothing is written unless all styles generated.
pub fn choreograph(config: &AppConfig) -> Result<()> {
    let events_path = config.events_path();
    let events = load_events(&events_path)
        .with_context(|| format!("Failed to load {:?}; run analyze first", events_path))?;
    println!(
        "Loaded event model: BPM={}, beats={}, onsets={}",
        events.bpm, events.beat_count, events.onset_count
    );

    let documents: Vec<TimelineDocument> = Style::ALL
        .iter()
        .map(|&style| TimelineDocument::generate(style, &events))
        .collect();

    for document in &documents {
        let out_path = config.timeline_path(&document.style.file_name());
        save_json(document, &out_path)
            .with_context(|| format!("Failed to save {:?}", out_path))?;
        println!(
            "  {}: {} actions -> {:?}",
            document.style, document.action_count, out_path
        );
    }
    Ok(())
}

/// Perform the requested styles against the live controller.
pub async fn perform(config: &AppConfig, styles: &[Style]) -> Result<()> {
    let client =
        ControllerClient::new(&config.controller).context("Failed to build controller client")?;
    let player = ProcessPlayer::from_config(&config.perform);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping performance");
            let _ = stop_tx.send(true);
        }
    });

    let mut performer = Performer::new(client, player, config).with_shutdown(stop_rx);
    info!("Performing {} style(s) via {}", styles.len(), config.controller.base_url);
    let results = performer.perform_styles(styles).await;

    let mut failed = 0;
    for (style, result) in &results {
        match result {
            Ok(outcome) => println!(
                "PASS {}: {} dispatched, {} failed{}",
                style,
                outcome.report.dispatched,
                outcome.report.failed,
                if outcome.report.cancelled {
                    " (stopped early)"
                } else {
                    ""
                }
            ),
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {}", style, e);
            }
        }
    }

    let skipped = styles.len() - results.len();
    if failed > 0 || skipped > 0 {
        bail!(
            "{} of {} styles failed, {} skipped",
            failed,
            styles.len(),
            skipped
        );
    }
    Ok(())
}
