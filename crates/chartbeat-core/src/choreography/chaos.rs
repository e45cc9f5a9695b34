//! Full chaos: symbol-surf style beat cycling at a different cadence, plus a
//! rate-limited trickle of overlay studies driven by onsets.

use super::catalog::{Cursor, CHART_TYPES, OVERLAY_STUDIES, SYMBOLS, TIMEFRAMES};
use super::chart_path;
use crate::action::{sort_timeline, Action, HttpMethod};
use crate::events::MusicalEvents;
use serde_json::json;

const TIMEFRAME_EVERY: usize = 6;
const CHART_TYPE_ENERGY: f64 = 0.65;
const CHART_TYPE_EVERY: usize = 4;
const ZOOM_STRENGTH: f64 = 0.8;
const ZOOM_EVERY: usize = 8;
/// Only every 12th onset is considered for a study
const STUDY_EVERY: usize = 12;
/// Hard cap on studies added over a whole performance
pub const MAX_STUDIES: usize = 8;

pub fn generate(events: &MusicalEvents) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut symbols = Cursor::new(SYMBOLS);
    let mut timeframes = Cursor::new(TIMEFRAMES);
    let mut chart_types = Cursor::new(CHART_TYPES);

    for (i, beat) in events.beats.iter().enumerate() {
        let t = beat.time;
        actions.push(Action::new(
            t,
            HttpMethod::Put,
            chart_path(&format!("symbol?symbol={}", symbols.next_item())),
        ));

        if i % TIMEFRAME_EVERY == 0 {
            actions.push(Action::new(
                t + 0.02,
                HttpMethod::Put,
                chart_path(&format!(
                    "timeframe?preset={}&resolution=1D",
                    timeframes.next_item()
                )),
            ));
        }

        if beat.energy > CHART_TYPE_ENERGY && i % CHART_TYPE_EVERY == 0 {
            actions.push(Action::new(
                t + 0.03,
                HttpMethod::Put,
                chart_path(&format!("chart-type?type={}", chart_types.next_item())),
            ));
        }

        if beat.strength > ZOOM_STRENGTH && i % ZOOM_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.04,
                HttpMethod::Post,
                chart_path("zoom"),
                json!({"direction": "out"}),
            ));
        }
    }

    let mut studies = Cursor::new(OVERLAY_STUDIES);
    let study_actions = events
        .onsets
        .iter()
        .step_by(STUDY_EVERY)
        .take(MAX_STUDIES)
        .map(|onset| {
            Action::with_body(
                onset.time + 0.01,
                HttpMethod::Post,
                chart_path("indicators/add"),
                json!({"query": studies.next_item(), "index": 0}),
            )
        });
    actions.extend(study_actions);

    // Beat and onset streams interleave
    sort_timeline(&mut actions);
    actions
}
