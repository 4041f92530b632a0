use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;

use super::TickSource;
use crate::engine::PriceTick;
use crate::errors::{Error, Result};
use crate::settings::SimConfig;

const BINANCE_API_BASE: &str = "https://api.binance.com";

/// A market data collaborator returning candles for a symbol.
pub trait KlineProvider {
    /// Fetches the last `limit` klines of `symbol` at `interval` (e.g. `"1s"`, `"1m"`), oldest first.
    fn klines(&self, symbol: &str, interval: &str, limit: u16) -> impl Future<Output = Result<Vec<PriceTick>>> + Send;
}

/// Client for the Binance public klines endpoint.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Points the client at another host (proxy or mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl KlineProvider for BinanceClient {
    async fn klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<PriceTick>> {
        let url = format!("{}/api/v3/klines", self.base_url.trim_end_matches('/'));
        let limit = limit.to_string();

        let rows: Vec<Vec<Value>> = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("interval", interval), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        rows.iter().map(|row| kline_to_tick(row)).collect()
    }
}

/// Maps one raw kline row `[open_time, open, high, low, close, volume, close_time, ...]`.
pub(crate) fn kline_to_tick(row: &[Value]) -> Result<PriceTick> {
    if row.len() < 5 {
        return Err(Error::MalformedKline(format!("expected at least 5 fields, got {}", row.len())));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| Error::MalformedKline(format!("open time: {}", row[0])))?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(open_time)
        .ok_or_else(|| Error::MalformedKline(format!("open time out of range: {open_time}")))?;

    let price = |idx: usize| -> Result<f64> {
        let parsed = match &row[idx] {
            Value::String(s) => s.parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };
        parsed.ok_or_else(|| Error::MalformedKline(format!("price field {idx}: {}", row[idx])))
    };

    PriceTick::try_from((timestamp, price(1)?, price(2)?, price(3)?, price(4)?))
}

/// Live ticks: the newest kline of a provider, emitted only when newer than the last one.
///
/// Failures are logged and swallowed: the simulation keeps its last known price.
#[derive(Debug, Clone)]
pub struct LiveFeed<K> {
    provider: K,
    symbol: String,
    interval: String,
    last_emitted: Option<DateTime<Utc>>,
}

impl<K: KlineProvider> LiveFeed<K> {
    pub fn new(provider: K, symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            interval: interval.into(),
            last_emitted: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl LiveFeed<BinanceClient> {
    /// Binance feed for the configured symbol and kline interval.
    ///
    /// Fails unless [`SimConfig::validate_live`] passes: a kline longer than the tick
    /// interval would only be seen once.
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        config.validate_live()?;
        let client = match &config.feed.base_url {
            Some(url) => BinanceClient::with_base_url(url.as_str()),
            None => BinanceClient::new(),
        };
        Ok(Self::new(client, config.feed.symbol.as_str(), config.feed.kline_interval.as_str()))
    }
}

impl<K: KlineProvider + Send + Sync> TickSource for LiveFeed<K> {
    async fn next_tick(&mut self, _last_close: Option<f64>) -> Option<PriceTick> {
        let ticks = match self.provider.klines(&self.symbol, &self.interval, 1).await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::warn!(symbol = %self.symbol, error = %e, "Live feed unavailable, keeping last price");
                return None;
            }
        };

        let tick = ticks.last().copied()?;
        if self.last_emitted.is_some_and(|last| tick.timestamp() <= last) {
            tracing::debug!(symbol = %self.symbol, "No newer kline");
            return None;
        }
        self.last_emitted = Some(tick.timestamp());
        Some(tick)
    }
}
