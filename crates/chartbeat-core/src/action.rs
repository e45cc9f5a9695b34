//! Timed controller calls
//!
//! An [`Action`] is one HTTP-style call against the chart controller, fired
//! at `time` seconds after the performance starts. A timeline is a plain
//! `Vec<Action>` kept sorted by non-decreasing time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Path prefix every generated action uses. The real chart id is swapped
/// in by [`Action::with_chart_id`] right before a performance.
pub const CHART_BASE: &str = "/api/v1/chart/0";

const CHART_SEGMENT: &str = "/chart/0/";

/// HTTP verb of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A single timed controller call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Fire time in seconds relative to performance start
    #[serde(rename = "t")]
    pub time: f64,
    pub method: HttpMethod,
    /// Controller path, may embed query parameters
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Action {
    /// Create an action without a body. Time is rounded to milliseconds.
    pub fn new(time: f64, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            time: round_to(time, 3),
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Create an action carrying a JSON body
    pub fn with_body(time: f64, method: HttpMethod, path: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(time, method, path)
        }
    }

    /// Rewrite the placeholder chart segment to the live chart id.
    pub fn with_chart_id(mut self, chart_id: &str) -> Self {
        self.path = self
            .path
            .replace(CHART_SEGMENT, &format!("/chart/{}/", chart_id));
        self
    }
}

/// Stable sort by fire time. Actions sharing a timestamp keep their
/// generation order.
pub fn sort_timeline(actions: &mut [Action]) {
    actions.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Check the non-decreasing time invariant
pub fn is_sorted(actions: &[Action]) -> bool {
    actions.windows(2).all(|pair| pair[0].time <= pair[1].time)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
