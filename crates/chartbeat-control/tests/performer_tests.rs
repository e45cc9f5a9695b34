use async_trait::async_trait;
use chartbeat_control::{
    ChartController, ControlError, Dispatch, Performer, Playback, Player, Result,
};
use chartbeat_core::{
    Action, AppConfig, ChartBounds, HttpMethod, Style, TimelineDocument, CHART_BASE,
};
use chartbeat_io::save_json;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

/// Shared log of everything the fakes saw
#[derive(Default, Clone)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct FakeController {
    journal: Journal,
    healthy: bool,
    bounds: Option<ChartBounds>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl FakeController {
    fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            healthy: true,
            bounds: Some(ChartBounds {
                time_from: 1_700_000_000.0,
                time_to: 1_700_086_400.0,
                price: 68_896.0,
            }),
            bodies: Arc::default(),
        }
    }
}

#[async_trait]
impl Dispatch for FakeController {
    async fn dispatch(&self, action: &Action) -> Result<()> {
        self.journal
            .push(format!("{} {}", action.method, action.path));
        if let Some(body) = &action.body {
            self.bodies.lock().unwrap().push(body.clone());
        }
        if action.path.ends_with("/broken") {
            return Err(ControlError::Status {
                method: action.method.to_string(),
                path: action.path.clone(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChartController for FakeController {
    async fn health(&self) -> Result<()> {
        self.journal.push("health");
        if self.healthy {
            Ok(())
        } else {
            Err(ControlError::Unhealthy("status 503".to_string()))
        }
    }

    async fn discover_chart_id(&self) -> Result<String> {
        Ok("42".to_string())
    }

    async fn fetch_bounds(&self, _chart_id: &str) -> Result<ChartBounds> {
        self.journal.push("bounds");
        self.bounds
            .ok_or_else(|| ControlError::Bounds("no price in chart title".to_string()))
    }

    async fn prep_chart(&self, chart_id: &str, settle: Duration) {
        self.journal.push(format!("prep {}", chart_id));
        tokio::time::sleep(settle).await;
    }
}

struct FakePlayer {
    journal: Journal,
}

struct FakePlayback {
    journal: Journal,
    started: Instant,
}

#[async_trait]
impl Player for FakePlayer {
    async fn start(&self, _clip: &Path) -> Result<Box<dyn Playback>> {
        self.journal.push("play");
        Ok(Box::new(FakePlayback {
            journal: self.journal.clone(),
            started: Instant::now(),
        }))
    }
}

#[async_trait]
impl Playback for FakePlayback {
    async fn stop(self: Box<Self>) -> Result<()> {
        let secs = self.started.elapsed().as_secs_f64().round();
        self.journal.push(format!("stop after {}s", secs));
        Ok(())
    }
}

fn workspace(styles: &[(Style, Vec<Action>)]) -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        output_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    std::fs::write(config.clip_path(), b"ID3").unwrap();
    for (style, actions) in styles {
        let document = TimelineDocument {
            style: *style,
            bpm: 120.0,
            duration: 4.0,
            action_count: actions.len(),
            actions: actions.clone(),
        };
        save_json(&document, &config.timeline_path(&style.file_name())).unwrap();
    }
    (dir, config)
}

fn put(t: f64, endpoint: &str) -> Action {
    Action::new(t, HttpMethod::Put, format!("{}/{}", CHART_BASE, endpoint))
}

#[tokio::test(start_paused = true)]
async fn performs_with_chart_id_and_trailing_buffer() {
    let (_dir, config) = workspace(&[(
        Style::SymbolSurf,
        vec![put(0.0, "symbol?symbol=ETHUSD"), put(1.5, "symbol?symbol=SOLUSD")],
    )]);
    let journal = Journal::default();
    let mut performer = Performer::new(
        FakeController::new(&journal),
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    );

    let outcome = performer.perform_style(Style::SymbolSurf).await.unwrap();
    assert_eq!(outcome.chart_id, "42");
    assert_eq!(outcome.report.dispatched, 2);

    assert_eq!(
        journal.entries(),
        vec![
            "health",
            "prep 42",
            "play",
            "PUT /api/v1/chart/42/symbol?symbol=ETHUSD",
            "PUT /api/v1/chart/42/symbol?symbol=SOLUSD",
            // 4s clip plus the 3s trailing buffer
            "stop after 7s",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn resolves_placeholders_before_playback() {
    let drawing = Action::with_body(
        1.0,
        HttpMethod::Post,
        format!("{}/drawings", CHART_BASE),
        json!({
            "point": {"time": "__RAND_TIME__", "price": "__RAND_PRICE__"},
            "options": {"shape": "arrow_up"},
        }),
    );
    let (_dir, config) = workspace(&[(Style::Drawing, vec![drawing])]);
    let journal = Journal::default();
    let controller = FakeController::new(&journal);
    let bodies = controller.bodies.clone();
    let mut performer = Performer::new(
        controller,
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    )
    .with_seed(7);

    performer.perform_style(Style::Drawing).await.unwrap();

    let entries = journal.entries();
    let bounds_at = entries.iter().position(|e| e == "bounds").unwrap();
    let play_at = entries.iter().position(|e| e == "play").unwrap();
    assert!(bounds_at < play_at);

    let bodies = bodies.lock().unwrap();
    let point = &bodies[0]["point"];
    let time = point["time"].as_i64().unwrap();
    let price = point["price"].as_f64().unwrap();
    assert!((1_700_000_000..=1_700_086_400).contains(&time));
    assert!((68_896.0 * 0.95..=68_896.0 * 1.05).contains(&price));
}

#[tokio::test(start_paused = true)]
async fn unhealthy_controller_aborts_before_audio() {
    let (_dir, config) = workspace(&[(Style::Chaos, vec![put(0.0, "zoom")])]);
    let journal = Journal::default();
    let mut controller = FakeController::new(&journal);
    controller.healthy = false;
    let mut performer = Performer::new(
        controller,
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    );

    let err = performer.perform_style(Style::Chaos).await.unwrap_err();
    assert!(matches!(err, ControlError::Unhealthy(_)));
    assert_eq!(journal.entries(), vec!["health"]);
}

#[tokio::test(start_paused = true)]
async fn bounds_failure_aborts_before_audio() {
    let drawing = Action::with_body(
        1.0,
        HttpMethod::Post,
        format!("{}/drawings", CHART_BASE),
        json!({"point": {"time": "__RAND_TIME__", "price": "__RAND_PRICE__"}}),
    );
    let (_dir, config) = workspace(&[(Style::Drawing, vec![drawing])]);
    let journal = Journal::default();
    let mut controller = FakeController::new(&journal);
    controller.bounds = None;
    let mut performer = Performer::new(
        controller,
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    );

    let err = performer.perform_style(Style::Drawing).await.unwrap_err();
    assert!(matches!(err, ControlError::Bounds(_)));
    let entries = journal.entries();
    assert_eq!(entries, vec!["health", "prep 42", "bounds"]);
    assert!(!entries.iter().any(|e| e == "play"));
}

#[tokio::test(start_paused = true)]
async fn missing_timeline_is_input_missing() {
    let (_dir, config) = workspace(&[]);
    let journal = Journal::default();
    let mut performer = Performer::new(
        FakeController::new(&journal),
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    );

    let err = performer.perform_style(Style::Replay).await.unwrap_err();
    assert!(err.is_input_missing());
    assert!(journal.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failures_are_isolated_across_styles() {
    let (_dir, config) = workspace(&[
        (Style::SymbolSurf, vec![put(0.0, "broken"), put(0.5, "zoom")]),
        (Style::Chaos, vec![put(0.0, "zoom")]),
    ]);
    let journal = Journal::default();
    let mut performer = Performer::new(
        FakeController::new(&journal),
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    );

    let started = Instant::now();
    let results = performer
        .perform_styles(&[Style::SymbolSurf, Style::Replay, Style::Chaos])
        .await;

    assert_eq!(results.len(), 3);
    let first = results[0].1.as_ref().unwrap();
    assert_eq!((first.report.dispatched, first.report.failed), (1, 1));
    assert!(results[1].1.as_ref().unwrap_err().is_input_missing());
    assert!(results[2].1.is_ok());

    // Two performances of 1s prep + 7s, separated by two 5s pauses
    assert_eq!(started.elapsed().as_secs_f64().round(), 26.0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_skips_remaining_styles() {
    let (_dir, config) = workspace(&[
        (Style::SymbolSurf, vec![put(0.0, "zoom"), put(3.0, "zoom")]),
        (Style::Chaos, vec![put(0.0, "zoom")]),
    ]);
    let journal = Journal::default();
    let (tx, rx) = tokio::sync::watch::channel(false);
    let mut performer = Performer::new(
        FakeController::new(&journal),
        FakePlayer {
            journal: journal.clone(),
        },
        &config,
    )
    .with_shutdown(rx);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let _ = tx.send(true);
    });

    let results = performer
        .perform_styles(&[Style::SymbolSurf, Style::Chaos])
        .await;

    assert_eq!(results.len(), 1);
    let outcome = results[0].1.as_ref().unwrap();
    assert!(outcome.report.cancelled);
    assert_eq!(outcome.report.dispatched, 1);
    assert!(journal.entries().contains(&"stop after 1s".to_string()));
}
