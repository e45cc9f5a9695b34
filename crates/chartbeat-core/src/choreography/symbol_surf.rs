//! Symbol surfing: a new symbol on every beat, timeframe shifts every 4th
//! beat, chart-type swaps on loud beats and a zoom-out snap on the hardest
//! hits.

use super::catalog::{Cursor, CHART_TYPES, SYMBOLS, TIMEFRAMES};
use super::chart_path;
use crate::action::{sort_timeline, Action, HttpMethod};
use crate::events::MusicalEvents;
use serde_json::json;

const TIMEFRAME_EVERY: usize = 4;
const CHART_TYPE_ENERGY: f64 = 0.7;
const CHART_TYPE_EVERY: usize = 3;
const ZOOM_STRENGTH: f64 = 0.85;
const ZOOM_EVERY: usize = 6;

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
                t + 0.05,
                HttpMethod::Put,
                chart_path(&format!(
                    "timeframe?preset={}&resolution=1D",
                    timeframes.next_item()
                )),
            ));
        }

        if beat.energy > CHART_TYPE_ENERGY && i % CHART_TYPE_EVERY == 0 {
            actions.push(Action::new(
                t + 0.02,
                HttpMethod::Put,
                chart_path(&format!("chart-type?type={}", chart_types.next_item())),
            ));
        }

        if beat.strength > ZOOM_STRENGTH && i % ZOOM_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.03,
                HttpMethod::Post,
                chart_path("zoom"),
                json!({"direction": "out"}),
            ));
            actions.push(Action::new(t + 0.3, HttpMethod::Post, chart_path("reset-view")));
        }
    }

    sort_timeline(&mut actions);
    actions
}
