//! Replay timelapse: bar replay stepped in time with the beat.
//!
//! Setup parks the chart in replay mode during the first 2.5 seconds. Each
//! later beat steps the replay forward, every 8th beat moves the autoplay
//! delay ladder, and rare heavy beats trigger a zoomed autoplay burst.

use super::catalog::{HOME_SYMBOL, RESOLUTIONS};
use super::chart_path;
use crate::action::{sort_timeline, Action, HttpMethod};
use crate::events::MusicalEvents;
use serde_json::json;

/// Beats before this point fall inside the setup sequence
const SETUP_SECONDS: f64 = 2.5;
/// Autoplay delays, slowest first. Higher energy climbs the ladder.
const DELAY_LADDER: [f64; 4] = [1.0, 0.5, 0.25, 0.1];
const BIG_STEP_STRENGTH: f64 = 0.7;
const LADDER_EVERY: usize = 8;
const LADDER_ENERGY: f64 = 0.6;
const BURST_STRENGTH: f64 = 0.9;
const BURST_EVERY: usize = 12;

/// Position on the autoplay delay ladder
#[derive(Debug, Default)]
struct DelayLadder {
    index: usize,
}

impl DelayLadder {
    fn step(&mut self, up: bool) -> f64 {
        self.index = if up {
            (self.index + 1).min(DELAY_LADDER.len() - 1)
        } else {
            self.index.saturating_sub(1)
        };
        DELAY_LADDER[self.index]
    }
}

pub fn generate(events: &MusicalEvents) -> Vec<Action> {
    let mut actions = vec![
        Action::new(
            0.0,
            HttpMethod::Put,
            chart_path(&format!("symbol?symbol={}", HOME_SYMBOL)),
        ),
        Action::new(
            0.3,
            HttpMethod::Put,
            chart_path(&format!("resolution?resolution={}", RESOLUTIONS[1])),
        ),
        Action::new(0.8, HttpMethod::Post, chart_path("replay/activate/auto")),
        Action::new(2.0, HttpMethod::Post, chart_path("replay/autoplay/stop")),
    ];
    let mut ladder = DelayLadder::default();

    for (i, beat) in events.beats.iter().enumerate() {
        let t = beat.time;
        if t < SETUP_SECONDS {
            continue;
        }

        let count = if beat.strength > BIG_STEP_STRENGTH { 3 } else { 1 };
        actions.push(Action::with_body(
            t,
            HttpMethod::Post,
            chart_path("replay/step"),
            json!({"count": count}),
        ));

        if i % LADDER_EVERY == 0 {
            let delay = ladder.step(beat.energy > LADDER_ENERGY);
            actions.push(Action::with_body(
                t + 0.02,
                HttpMethod::Put,
                chart_path("replay/autoplay/delay"),
                json!({"delay": delay}),
            ));
        }

        if beat.strength > BURST_STRENGTH && i % BURST_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.05,
                HttpMethod::Post,
                chart_path("zoom"),
                json!({"direction": "in"}),
            ));
            actions.push(Action::new(
                t + 0.1,
                HttpMethod::Post,
                chart_path("replay/autoplay/start"),
            ));
            actions.push(Action::new(
                t + 2.0,
                HttpMethod::Post,
                chart_path("replay/autoplay/stop"),
            ));
            actions.push(Action::with_body(
                t + 2.1,
                HttpMethod::Post,
                chart_path("zoom"),
                json!({"direction": "out"}),
            ));
        }
    }

    actions.push(Action::new(
        events.duration - 1.0,
        HttpMethod::Post,
        chart_path("replay/deactivate"),
    ));
    sort_timeline(&mut actions);
    actions
}
