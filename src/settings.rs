//! Session configuration.
//!
//! Values come from an optional file (TOML, JSON or YAML, picked by extension) and are
//! overridden by `DTS_*` environment variables, nested keys separated by `__`:
//!
//! ```text
//! DTS_INITIAL_BALANCE=5000
//! DTS_FEED__VOLATILITY=0.01
//! DTS_FEED__SEED=42
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, Source};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Everything needed to start a demo session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed balance of the virtual account.
    pub initial_balance: f64,
    /// Value of one unit of price movement per unit of quantity.
    pub contract_multiplier: f64,
    /// Milliseconds between two ticks.
    pub interval_ms: u64,
    /// Price source settings.
    pub feed: FeedConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            contract_multiplier: 1.0,
            interval_ms: 1_000,
            feed: FeedConfig::default(),
        }
    }
}

/// Price source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// First open of the synthetic walk.
    pub start_price: f64,
    /// Largest close move per tick, as a fraction of the open.
    pub volatility: f64,
    /// Seed for a reproducible walk.
    pub seed: Option<u64>,
    /// Market symbol for live klines.
    pub symbol: String,
    /// Kline interval for live klines.
    pub kline_interval: String,
    /// Override of the market data host.
    pub base_url: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            volatility: 0.002,
            seed: None,
            symbol: "BTCUSDT".to_string(),
            kline_interval: "1s".to_string(),
            base_url: None,
        }
    }
}

impl FeedConfig {
    /// Length of one kline, from exchange notation (`1s`, `15m`, `4h`, `1d`, `1w`, `1M`).
    pub fn kline_duration(&self) -> Result<Duration> {
        let invalid = || Error::InvalidKlineInterval(self.kline_interval.clone());
        let unit = self.kline_interval.chars().last().ok_or_else(invalid)?;
        let count: u64 = self.kline_interval[..self.kline_interval.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;
        let secs = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            'M' => 2_592_000,
            _ => return Err(invalid()),
        };
        count
            .checked_mul(secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    }
}

impl SimConfig {
    /// Loads the configuration from `path` (if any) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(environment())
            .build()?;

        Self::from_config(config)
    }

    /// Loads the configuration from a single source, ignoring the environment.
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = Config::builder().add_source(source).build()?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let sim: Self = config.try_deserialize()?;
        sim.validate()?;
        tracing::debug!(?sim, "Configuration loaded");
        Ok(sim)
    }

    /// Checks every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(Error::NegZeroBalance(self.initial_balance));
        }
        if !self.contract_multiplier.is_finite() || self.contract_multiplier <= 0.0 {
            return Err(Error::InvalidMultiplier(self.contract_multiplier));
        }
        if self.interval_ms == 0 {
            return Err(Error::InvalidInterval);
        }
        if !self.feed.start_price.is_finite() || self.feed.start_price <= 0.0 {
            return Err(Error::InvalidPrice(self.feed.start_price));
        }
        if !(self.feed.volatility > 0.0 && self.feed.volatility < 1.0) {
            return Err(Error::InvalidVolatility(self.feed.volatility));
        }
        self.feed.kline_duration()?;
        Ok(())
    }

    /// Checks the configuration can drive a live feed.
    ///
    /// A live feed only sees a kline once, so a kline longer than the tick interval would
    /// hide every price move after its first fetch.
    pub fn validate_live(&self) -> Result<()> {
        self.validate()?;
        let kline = self.feed.kline_duration()?;
        if kline > self.interval() {
            return Err(Error::InvalidKlineInterval(format!(
                "{} is longer than the {} ms tick interval",
                self.feed.kline_interval, self.interval_ms
            )));
        }
        Ok(())
    }

    /// Time between two ticks.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("DTS").prefix_separator("_").separator("__").try_parsing(true)
}
