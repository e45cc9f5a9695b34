//! HTTP client for the chart controller
//!
//! The controller exposes a small REST surface: a health probe, the list of
//! open charts, the visible range of a chart, and the mutation endpoints the
//! choreography timelines call.

use crate::error::{ControlError, Result};
use crate::performer::ChartController;
use crate::scheduler::Dispatch;
use async_trait::async_trait;
use chartbeat_core::{Action, ChartBounds, ControllerConfig, HttpMethod};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Symbol a chart is reset to before each performance
pub const PREP_SYMBOL: &str = "BTCUSD";

#[derive(Debug, Deserialize)]
struct ChartList {
    #[serde(default)]
    charts: Vec<ChartInfo>,
}

#[derive(Debug, Deserialize)]
struct ChartInfo {
    chart_id: ChartId,
    #[serde(default)]
    title: String,
}

/// Chart ids arrive as strings or bare numbers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ChartId {
    Text(String),
    Number(i64),
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartId::Text(s) => f.write_str(s),
            ChartId::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VisibleRange {
    from: f64,
    to: f64,
}

/// Current price from a chart title such as `"BTCUSD 68,896 ▲ +0.12%"`.
///
/// Only the text before the first direction arrow is searched. Thousands
/// separators are stripped.
pub fn parse_title_price(title: &str) -> Option<f64> {
    let head = title.split(['▲', '▼']).next().unwrap_or_default();
    let start = head.find(|c: char| c.is_ascii_digit())?;
    let rest = &head[start..];

    let mut end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == ','))
        .unwrap_or(rest.len());
    if rest[end..].starts_with('.') {
        let fraction = &rest[end + 1..];
        end += 1 + fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
    }

    let price: f64 = rest[..end].replace(',', "").parse().ok()?;
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Client for one chart controller
#[derive(Debug, Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControllerClient {
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probe `/health`; anything but 200 (or no answer) is unhealthy.
    pub async fn health(&self) -> Result<()> {
        let resp = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ControlError::Unhealthy(format!("not reachable: {}", e)))?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(ControlError::Unhealthy(format!("status {}", resp.status())));
        }
        Ok(())
    }

    async fn charts(&self) -> Result<Vec<ChartInfo>> {
        let resp = self.http.get(self.url("/api/v1/charts")).send().await?;
        let resp = check_status(resp, "GET", "/api/v1/charts")?;
        let list: ChartList = resp.json().await?;
        Ok(list.charts)
    }

    /// Id of the first open chart
    pub async fn discover_chart_id(&self) -> Result<String> {
        let charts = self.charts().await?;
        let first = charts.first().ok_or(ControlError::NoCharts)?;
        let id = first.chart_id.to_string();
        info!("Discovered chart {}", id);
        Ok(id)
    }

    /// Visible time range and current price of a chart
    pub async fn fetch_bounds(&self, chart_id: &str) -> Result<ChartBounds> {
        let path = format!("/api/v1/chart/{}/visible-range", chart_id);
        let resp = self.http.get(self.url(&path)).send().await?;
        let range: VisibleRange = check_status(resp, "GET", &path)?.json().await?;

        let charts = self.charts().await?;
        let title = charts
            .iter()
            .find(|c| c.chart_id.to_string() == chart_id)
            .map(|c| c.title.as_str())
            .ok_or_else(|| ControlError::Bounds(format!("chart {} not listed", chart_id)))?;
        let price = parse_title_price(title).ok_or_else(|| {
            ControlError::Bounds(format!("no price in chart title {:?}", title))
        })?;

        let bounds = ChartBounds {
            time_from: range.from,
            time_to: range.to,
            price,
        };
        bounds
            .validate()
            .map_err(|e| ControlError::Bounds(e.to_string()))?;
        info!(
            "Chart bounds: time={}-{}, price≈{:.0}",
            bounds.time_from, bounds.time_to, bounds.price
        );
        Ok(bounds)
    }

    /// Send one request; non-2xx answers are errors.
    pub async fn send(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<()> {
        let mut request = self.http.request(to_reqwest(method), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;
        check_status(resp, &method.to_string(), path)?;
        Ok(())
    }

    /// Put the chart into a known state: reset view, clear drawings, home
    /// symbol, candles. Individual failures are logged and skipped.
    pub async fn prep_chart(&self, chart_id: &str, settle: Duration) {
        let base = format!("/api/v1/chart/{}", chart_id);
        let steps = [
            (HttpMethod::Post, format!("{}/reset-view", base)),
            (HttpMethod::Delete, format!("{}/drawings", base)),
            (HttpMethod::Put, format!("{}/symbol?symbol={}", base, PREP_SYMBOL)),
            (HttpMethod::Put, format!("{}/chart-type?type=candles", base)),
        ];
        for (method, path) in &steps {
            if let Err(e) = self.send(*method, path, None).await {
                warn!("Chart prep {} {} failed: {}", method, path, e);
            }
        }
        tokio::time::sleep(settle).await;
        debug!("Chart {} prepped", chart_id);
    }
}

#[async_trait]
impl Dispatch for ControllerClient {
    async fn dispatch(&self, action: &Action) -> Result<()> {
        self.send(action.method, &action.path, action.body.as_ref())
            .await
    }
}

#[async_trait]
impl ChartController for ControllerClient {
    async fn health(&self) -> Result<()> {
        ControllerClient::health(self).await
    }

    async fn discover_chart_id(&self) -> Result<String> {
        ControllerClient::discover_chart_id(self).await
    }

    async fn fetch_bounds(&self, chart_id: &str) -> Result<ChartBounds> {
        ControllerClient::fetch_bounds(self, chart_id).await
    }

    async fn prep_chart(&self, chart_id: &str, settle: Duration) {
        ControllerClient::prep_chart(self, chart_id, settle).await
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn check_status(resp: reqwest::Response, method: &str, path: &str) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(ControlError::Status {
            method: method.to_string(),
            path: path.to_string(),
            status: resp.status().as_u16(),
        })
    }
}
