//! Drawing art: shapes appear on the beat and get wiped on the drop.
//!
//! Coordinates are left as placeholder tokens; they are resolved against the
//! live chart's visible range right before the performance.

use super::catalog::{
    Cursor, DRAWING_TOOLS, HOME_SYMBOL, MULTI_POINT_SHAPES, RESOLUTIONS, SINGLE_POINT_SHAPES,
};
use super::chart_path;
use crate::action::{sort_timeline, Action, HttpMethod};
use crate::events::MusicalEvents;
use crate::placeholder::{PRICE_TOKEN, SECOND_PRICE_TOKEN, SECOND_TIME_TOKEN, TIME_TOKEN};
use serde_json::json;

/// Beats before this point fall inside the setup sequence
const SETUP_SECONDS: f64 = 1.0;
const SINGLE_EVERY: usize = 2;
const MULTI_EVERY: usize = 3;
const TOOL_STRENGTH: f64 = 0.7;
const TOOL_EVERY: usize = 4;
const CLEAR_ENERGY: f64 = 0.85;
const CLEAR_STRENGTH: f64 = 0.8;
/// Drawings that must pile up before a drop may wipe them
const CLEAR_AFTER: usize = 10;
const FLASH_EVERY: usize = 5;

pub fn generate(events: &MusicalEvents) -> Vec<Action> {
    let mut actions = vec![
        Action::new(
            0.0,
            HttpMethod::Put,
            chart_path(&format!("symbol?symbol={}", HOME_SYMBOL)),
        ),
        Action::new(
            0.2,
            HttpMethod::Put,
            chart_path(&format!("timeframe?preset=1M&resolution={}", RESOLUTIONS[2])),
        ),
        Action::new(0.5, HttpMethod::Delete, chart_path("drawings")),
    ];

    let mut tools = Cursor::new(DRAWING_TOOLS);
    let mut single_shapes = Cursor::new(SINGLE_POINT_SHAPES);
    let mut multi_shapes = Cursor::new(MULTI_POINT_SHAPES);
    let mut drawing_count = 0usize;

    for (i, beat) in events.beats.iter().enumerate() {
        let t = beat.time;
        if t < SETUP_SECONDS {
            continue;
        }

        if i % SINGLE_EVERY == 0 {
            actions.push(Action::with_body(
                t,
                HttpMethod::Post,
                chart_path("drawings"),
                json!({
                    "point": {"time": TIME_TOKEN, "price": PRICE_TOKEN},
                    "options": {"shape": single_shapes.next_item()},
                }),
            ));
            drawing_count += 1;
        }

        if i % MULTI_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.02,
                HttpMethod::Post,
                chart_path("drawings/multipoint"),
                json!({
                    "points": [
                        {"time": TIME_TOKEN, "price": PRICE_TOKEN},
                        {"time": SECOND_TIME_TOKEN, "price": SECOND_PRICE_TOKEN},
                    ],
                    "options": {"shape": multi_shapes.next_item()},
                }),
            ));
            drawing_count += 1;
        }

        if beat.strength > TOOL_STRENGTH && i % TOOL_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.03,
                HttpMethod::Put,
                chart_path("drawings/tool"),
                json!({"tool": tools.next_item()}),
            ));
        }

        if beat.energy > CLEAR_ENERGY && beat.strength > CLEAR_STRENGTH && drawing_count > CLEAR_AFTER
        {
            actions.push(Action::new(t + 0.04, HttpMethod::Delete, chart_path("drawings")));
            drawing_count = 0;
        }

        if i % FLASH_EVERY == 0 {
            actions.push(Action::with_body(
                t + 0.05,
                HttpMethod::Put,
                chart_path("drawings/toggles/hide"),
                json!({"value": true}),
            ));
            actions.push(Action::with_body(
                t + 0.3,
                HttpMethod::Put,
                chart_path("drawings/toggles/hide"),
                json!({"value": false}),
            ));
        }
    }

    sort_timeline(&mut actions);
    actions
}
