use chartbeat_core::choreography::chaos::MAX_STUDIES;
use chartbeat_core::{
    is_sorted, resolve_timeline, timeline_has_placeholders, Action, Beat, ChartBounds,
    HttpMethod, MusicalEvents, Onset, Style, TimelineDocument,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn beat(time: f64, strength: f64, energy: f64) -> Beat {
    Beat {
        time,
        strength,
        energy,
    }
}

fn events_with(beats: Vec<Beat>, onsets: Vec<Onset>, duration: f64) -> MusicalEvents {
    MusicalEvents::new(174.0, duration, beats, onsets, Vec::new(), Vec::new())
}

/// A minute of busy synthetic music with varied strengths and energies
fn busy_events() -> MusicalEvents {
    let beats = (0..170)
        .map(|i| {
            let strength = ((i * 37) % 100) as f64 / 100.0;
            let energy = ((i * 53) % 100) as f64 / 100.0;
            beat(0.345 * i as f64, strength, energy)
        })
        .collect();
    let onsets = (0..400)
        .map(|i| Onset {
            time: 0.15 * i as f64,
            strength: ((i * 13) % 100) as f64 / 100.0,
        })
        .collect();
    events_with(beats, onsets, 60.0)
}

fn paths_ending(actions: &[Action], suffix: &str) -> Vec<Action> {
    actions
        .iter()
        .filter(|a| a.path.ends_with(suffix))
        .cloned()
        .collect()
}

fn assert_time(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected t={} got t={}",
        expected,
        actual
    );
}

#[test]
fn test_symbol_surf_four_beat_scenario() {
    let events = events_with(
        vec![
            beat(1.0, 0.9, 0.8),
            beat(2.0, 0.3, 0.2),
            beat(3.0, 0.95, 0.9),
            beat(4.0, 0.4, 0.3),
        ],
        Vec::new(),
        5.0,
    );
    let actions = Style::SymbolSurf.generate(&events);

    let symbols: Vec<&Action> = actions
        .iter()
        .filter(|a| a.path.contains("/symbol?symbol="))
        .collect();
    assert_eq!(symbols.len(), 4);
    for (action, t) in symbols.iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert_time(action.time, t);
        assert_eq!(action.method, HttpMethod::Put);
    }
    assert!(symbols[0].path.ends_with("symbol=BTCUSD"));
    assert!(symbols[3].path.ends_with("symbol=AAPL"));

    let timeframes: Vec<&Action> = actions
        .iter()
        .filter(|a| a.path.contains("/timeframe?"))
        .collect();
    assert_eq!(timeframes.len(), 1);
    assert_time(timeframes[0].time, 1.05);
    assert!(timeframes[0].path.contains("preset=1D"));

    let zooms = paths_ending(&actions, "/zoom");
    assert_eq!(zooms.len(), 1);
    assert_time(zooms[0].time, 1.03);
    assert_eq!(zooms[0].body.as_ref().unwrap()["direction"], "out");

    let resets = paths_ending(&actions, "/reset-view");
    assert_eq!(resets.len(), 1);
    assert_time(resets[0].time, 1.3);

    // Beat 0 is loud enough for a chart type swap; beat 3 is not
    let chart_types: Vec<&Action> = actions
        .iter()
        .filter(|a| a.path.contains("/chart-type?"))
        .collect();
    assert_eq!(chart_types.len(), 1);
    assert_time(chart_types[0].time, 1.02);

    assert_eq!(actions.len(), 8);
    assert!(is_sorted(&actions));
}

#[test]
fn test_every_style_is_sorted() {
    let events = busy_events();
    for style in Style::ALL {
        let actions = style.generate(&events);
        assert!(!actions.is_empty(), "{} produced nothing", style);
        assert!(is_sorted(&actions), "{} is not time-ordered", style);
    }
}

#[test]
fn test_every_style_is_deterministic() {
    let events = busy_events();
    for style in Style::ALL {
        let first = serde_json::to_string(&TimelineDocument::generate(style, &events)).unwrap();
        let second = serde_json::to_string(&TimelineDocument::generate(style, &events)).unwrap();
        assert_eq!(first, second, "{} is not deterministic", style);
    }
}

#[test]
fn test_chaos_caps_studies() {
    let events = busy_events();
    let actions = Style::Chaos.generate(&events);
    let studies = paths_ending(&actions, "/indicators/add");
    assert_eq!(studies.len(), MAX_STUDIES);
    // Every 12th onset, offset by 10ms
    assert_time(studies[1].time, 0.15 * 12.0 + 0.01);
    assert_eq!(
        studies[0].body.as_ref().unwrap()["query"],
        "Moving Average Exponential"
    );
}

#[test]
fn test_chaos_samples_every_twelfth_onset() {
    let onsets = (0..30)
        .map(|i| Onset {
            time: i as f64,
            strength: 0.5,
        })
        .collect();
    let actions = Style::Chaos.generate(&events_with(Vec::new(), onsets, 30.0));
    let studies = paths_ending(&actions, "/indicators/add");
    assert_eq!(studies.len(), 3);
    assert_time(studies[2].time, 24.01);
}

#[test]
fn test_chaos_beat_cadence() {
    let beats = (0..9).map(|i| beat(i as f64 + 1.0, 0.9, 0.9)).collect();
    let actions = Style::Chaos.generate(&events_with(beats, Vec::new(), 12.0));
    // Symbols every beat, timeframes at 0 and 6, chart type at 0, 4, 8,
    // zoom at 0 and 8
    assert_eq!(
        actions.iter().filter(|a| a.path.contains("/symbol?")).count(),
        9
    );
    assert_eq!(
        actions.iter().filter(|a| a.path.contains("/timeframe?")).count(),
        2
    );
    assert_eq!(
        actions.iter().filter(|a| a.path.contains("/chart-type?")).count(),
        3
    );
    assert_eq!(paths_ending(&actions, "/zoom").len(), 2);
}

#[test]
fn test_replay_steps_ladder_and_burst() {
    let beats = (0..=24)
        .map(|i| {
            let strength = match i {
                1 => 0.8,
                12 => 0.95,
                _ => 0.5,
            };
            let energy = match i {
                8 | 24 => 0.7,
                16 => 0.1,
                _ => 0.5,
            };
            beat(2.0 + 0.5 * i as f64, strength, energy)
        })
        .collect();
    let actions = Style::Replay.generate(&events_with(beats, Vec::new(), 20.0));

    // Setup sequence comes first
    assert!(actions[0].path.ends_with("/symbol?symbol=BTCUSD"));
    assert!(actions[1].path.ends_with("/resolution?resolution=5"));
    assert!(actions[2].path.ends_with("/replay/activate/auto"));
    assert!(actions[3].path.ends_with("/replay/autoplay/stop"));

    // Beat 0 sits in the setup window
    let steps = paths_ending(&actions, "/replay/step");
    assert_eq!(steps.len(), 24);
    assert_eq!(steps[0].body.as_ref().unwrap()["count"], 3);
    assert_eq!(steps[1].body.as_ref().unwrap()["count"], 1);

    let delays: Vec<f64> = paths_ending(&actions, "/replay/autoplay/delay")
        .iter()
        .map(|a| a.body.as_ref().unwrap()["delay"].as_f64().unwrap())
        .collect();
    assert_eq!(delays, vec![0.5, 1.0, 0.5]);

    assert_eq!(paths_ending(&actions, "/replay/autoplay/start").len(), 1);
    assert_eq!(paths_ending(&actions, "/zoom").len(), 2);

    let last = actions.last().unwrap();
    assert!(last.path.ends_with("/replay/deactivate"));
    assert_time(last.time, 19.0);
    assert!(is_sorted(&actions));
}

#[test]
fn test_replay_without_beats_is_setup_and_teardown() {
    let actions = Style::Replay.generate(&events_with(Vec::new(), Vec::new(), 30.0));
    assert_eq!(actions.len(), 5);
    assert_time(actions[4].time, 29.0);
}

#[test]
fn test_drawing_clears_only_after_enough_drawings() {
    let beats = (0..=40)
        .map(|i| match i {
            2 | 30 => beat(1.0 + 0.5 * i as f64, 0.9, 0.9),
            32 => beat(1.0 + 0.5 * i as f64, 0.75, 0.5),
            _ => beat(1.0 + 0.5 * i as f64, 0.5, 0.5),
        })
        .collect();
    let actions = Style::Drawing.generate(&events_with(beats, Vec::new(), 25.0));

    let clears: Vec<&Action> = actions
        .iter()
        .filter(|a| a.method == HttpMethod::Delete && a.path.ends_with("/drawings"))
        .collect();
    // Setup clear plus the drop at beat 30; beat 2 comes too early
    assert_eq!(clears.len(), 2);
    assert_time(clears[1].time, 1.0 + 15.0 + 0.04);

    assert_eq!(paths_ending(&actions, "/drawings/tool").len(), 1);

    let flashes = paths_ending(&actions, "/drawings/toggles/hide");
    assert_eq!(flashes.len(), 18);
    assert_eq!(flashes[0].body.as_ref().unwrap()["value"], true);

    let singles = actions
        .iter()
        .filter(|a| a.method == HttpMethod::Post && a.path.ends_with("/drawings"))
        .count();
    assert_eq!(singles, 21);
    assert_eq!(paths_ending(&actions, "/drawings/multipoint").len(), 14);
    assert!(timeline_has_placeholders(&actions));
}

#[test]
fn test_drawing_skips_setup_window() {
    let beats = vec![beat(0.2, 1.0, 1.0), beat(0.6, 1.0, 1.0)];
    let actions = Style::Drawing.generate(&events_with(beats, Vec::new(), 2.0));
    assert_eq!(actions.len(), 3);
    assert!(!timeline_has_placeholders(&actions));
}

#[test]
fn test_resolved_drawing_timeline_is_concrete() {
    let actions = Style::Drawing.generate(&busy_events());
    let bounds = ChartBounds {
        time_from: 1_700_000_000.0,
        time_to: 1_702_592_000.0,
        price: 68_896.0,
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let resolved = resolve_timeline(&actions, &bounds, &mut rng).unwrap();

    assert_eq!(resolved.len(), actions.len());
    assert!(!timeline_has_placeholders(&resolved));

    for action in resolved.iter().filter(|a| a.path.contains("/drawings/multipoint")) {
        let points = action.body.as_ref().unwrap()["points"].as_array().unwrap();
        for point in points {
            let time = point["time"].as_i64().unwrap() as f64;
            assert!(time >= bounds.time_from && time <= bounds.time_to);
            let price = point["price"].as_f64().unwrap();
            assert!(price >= bounds.price * 0.95 - 1e-6 && price <= bounds.price * 1.05 + 1e-6);
        }
    }
    // Resolution never touches timing or ordering
    for (before, after) in actions.iter().zip(&resolved) {
        assert_eq!(before.time, after.time);
        assert_eq!(before.path, after.path);
    }
}
