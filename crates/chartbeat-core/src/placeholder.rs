//! Placeholder resolution
//!
//! Generated timelines leave drawing coordinates as string tokens because the
//! chart's visible range is only known at performance time. Resolution swaps
//! every token for a value sampled inside the live bounds. Each action gets
//! its own draw; within an action, the same token always maps to the same
//! value so a two-point shape stays consistent.

use crate::action::{round_to, Action};
use crate::error::{CoreError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// First point time, anywhere in the visible range
pub const TIME_TOKEN: &str = "__RAND_TIME__";
/// Second point time, biased into the later part of the range
pub const SECOND_TIME_TOKEN: &str = "__RAND_TIME2__";
/// First point price, within ±5% of the current price
pub const PRICE_TOKEN: &str = "__RAND_PRICE__";
/// Second point price, sampled independently of the first
pub const SECOND_PRICE_TOKEN: &str = "__RAND_PRICE2__";

const TOKEN_PREFIX: &str = "__RAND_";
const PRICE_BAND: f64 = 0.05;

/// Snapshot of what the live chart is showing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartBounds {
    /// Left edge of the visible range (unix seconds)
    pub time_from: f64,
    /// Right edge of the visible range (unix seconds)
    pub time_to: f64,
    /// Last traded price of the displayed symbol
    pub price: f64,
}

impl ChartBounds {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_from.is_finite() && self.time_to.is_finite()) || self.time_to <= self.time_from {
            return Err(CoreError::InvalidBounds(format!(
                "visible range {}..{} is empty",
                self.time_from, self.time_to
            )));
        }
        if self.time_from.ceil() > self.time_to.floor() {
            return Err(CoreError::InvalidBounds(format!(
                "visible range {}..{} holds no whole second",
                self.time_from, self.time_to
            )));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(CoreError::InvalidBounds(format!(
                "price {} is not positive",
                self.price
            )));
        }
        Ok(())
    }

    fn span(&self) -> f64 {
        self.time_to - self.time_from
    }

    /// Whole seconds inside the range. `validate` guarantees one exists.
    fn whole_seconds(&self, t: f64) -> Value {
        let t = t.floor().clamp(self.time_from.ceil(), self.time_to.floor());
        Value::from(t as i64)
    }

    fn price_value(&self, p: f64) -> Value {
        let lo = self.price * (1.0 - PRICE_BAND);
        let hi = self.price * (1.0 + PRICE_BAND);
        Value::from(round_to(p, 2).clamp(lo, hi))
    }
}

/// One action's worth of sampled coordinates
struct Draw {
    time: Value,
    second_time: Value,
    price: Value,
    second_price: Value,
}

impl Draw {
    fn sample<R: Rng + ?Sized>(bounds: &ChartBounds, rng: &mut R) -> Self {
        let span = bounds.span();
        let t1 = bounds.time_from + rng.random::<f64>() * span;
        let t2 = bounds.time_from + (0.3 + rng.random::<f64>() * 0.5) * span;
        let p1 = bounds.price * (1.0 - PRICE_BAND + rng.random::<f64>() * 2.0 * PRICE_BAND);
        let p2 = bounds.price * (1.0 - PRICE_BAND + rng.random::<f64>() * 2.0 * PRICE_BAND);
        Self {
            time: bounds.whole_seconds(t1),
            second_time: bounds.whole_seconds(t2),
            price: bounds.price_value(p1),
            second_price: bounds.price_value(p2),
        }
    }

    fn lookup(&self, token: &str) -> Result<Value> {
        match token {
            TIME_TOKEN => Ok(self.time.clone()),
            SECOND_TIME_TOKEN => Ok(self.second_time.clone()),
            PRICE_TOKEN => Ok(self.price.clone()),
            SECOND_PRICE_TOKEN => Ok(self.second_price.clone()),
            other => Err(CoreError::UnknownPlaceholder(other.to_string())),
        }
    }
}

fn is_token(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.starts_with(TOKEN_PREFIX))
}

/// True if any string in `value` is a placeholder token
pub fn contains_placeholders(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(contains_placeholders),
        Value::Object(map) => map.values().any(contains_placeholders),
        other => is_token(other),
    }
}

/// True if any action body in the timeline still needs resolving
pub fn timeline_has_placeholders(actions: &[Action]) -> bool {
    actions
        .iter()
        .filter_map(|a| a.body.as_ref())
        .any(contains_placeholders)
}

fn substitute(value: &mut Value, draw: &Draw) -> Result<()> {
    match value {
        Value::Array(items) => items.iter_mut().try_for_each(|v| substitute(v, draw)),
        Value::Object(map) => map.values_mut().try_for_each(|v| substitute(v, draw)),
        Value::String(s) if s.starts_with(TOKEN_PREFIX) => {
            let replacement = draw.lookup(s)?;
            *value = replacement;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Resolve a single action. Actions without tokens come back unchanged;
/// any other action needs valid bounds.
pub fn resolve_action<R: Rng + ?Sized>(
    action: &Action,
    bounds: &ChartBounds,
    rng: &mut R,
) -> Result<Action> {
    let Some(body) = action.body.as_ref().filter(|b| contains_placeholders(b)) else {
        return Ok(action.clone());
    };

    bounds.validate()?;
    let draw = Draw::sample(bounds, rng);
    let mut resolved = body.clone();
    substitute(&mut resolved, &draw)?;
    Ok(Action {
        body: Some(resolved),
        ..action.clone()
    })
}

/// Resolve a whole timeline against live bounds.
///
/// Fails without returning a partial timeline if the bounds are unusable
/// or any body holds an unknown token.
pub fn resolve_timeline<R: Rng + ?Sized>(
    actions: &[Action],
    bounds: &ChartBounds,
    rng: &mut R,
) -> Result<Vec<Action>> {
    bounds.validate()?;
    let resolved = actions
        .iter()
        .map(|action| resolve_action(action, bounds, rng))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "Resolved placeholders in {} actions",
        actions
            .iter()
            .filter(|a| a.body.as_ref().is_some_and(contains_placeholders))
            .count()
    );
    Ok(resolved)
}
