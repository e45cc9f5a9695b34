//! Fixed catalogs the generators cycle through

pub const SYMBOLS: &[&str] = &[
    "BTCUSD", "ETHUSD", "SPY", "AAPL", "TSLA", "NVDA", "AMZN", "EURUSD", "XAUUSD", "SOLUSDT",
    "GOOGL", "MSFT", "META", "ADAUSD", "DOTUSD", "AVAXUSD", "LINKUSD", "MATICUSD",
];

pub const TIMEFRAMES: &[&str] = &["1D", "5D", "1M", "3M", "6M", "1Y"];

pub const RESOLUTIONS: &[&str] = &["1", "5", "15", "60", "1D"];

pub const CHART_TYPES: &[&str] = &[
    "candles",
    "bars",
    "line",
    "area",
    "heikin_ashi",
    "hollow_candles",
    "baseline",
];

/// Studies that draw on the price pane without opening a sub-pane
pub const OVERLAY_STUDIES: &[&str] = &[
    "Moving Average Exponential",
    "Bollinger Bands",
    "Ichimoku Cloud",
    "Moving Average",
    "Volume Weighted Average Price",
    "Parabolic SAR",
];

pub const DRAWING_TOOLS: &[&str] = &[
    "trend_line",
    "horizontal_line",
    "rectangle",
    "fib_retracement",
    "arrow_up",
    "text",
];

pub const SINGLE_POINT_SHAPES: &[&str] = &[
    "horizontal_line",
    "arrow_up",
    "arrow_down",
    "flag",
    "text",
    "price_label",
];

pub const MULTI_POINT_SHAPES: &[&str] = &[
    "trend_line",
    "rectangle",
    "fib_retracement",
    "regression_trend",
    "ray",
    "info_line",
];

/// Symbol every performance starts from
pub const HOME_SYMBOL: &str = "BTCUSD";

/// Rotating index into a catalog. Wraps forever.
#[derive(Debug, Clone)]
pub struct Cursor {
    items: &'static [&'static str],
    index: usize,
}

impl Cursor {
    pub fn new(items: &'static [&'static str]) -> Self {
        Self { items, index: 0 }
    }

    /// Current item, then advance
    pub fn next_item(&mut self) -> &'static str {
        let item = self.items[self.index % self.items.len()];
        self.index += 1;
        item
    }
}
