use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::TickSource;
use crate::settings::SimConfig;
use crate::engine::{PriceTick, PriceTickBuilder};
use crate::errors::{Error, Result};

/// Random-walk price generator.
///
/// Each tick opens at the previous close and moves the close by at most `volatility`
/// (as a fraction of the open). Wicks extend at most half that again beyond the body.
/// Timestamps follow the feed's own clock: one `step` per generated tick.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    rng: StdRng,
    volatility: f64,
    start_price: f64,
    next_at: DateTime<Utc>,
    step: TimeDelta,
}

impl SyntheticFeed {
    /// Creates a feed starting at `start_price`, with ticks stamped from `start` every `step`.
    ///
    /// ### Example
    /// ```rust
    /// use std::time::Duration;
    ///
    /// use chrono::DateTime;
    /// use dts_rs::prelude::*;
    ///
    /// let mut feed = SyntheticFeed::new(100.0, 0.01, Duration::from_secs(1), DateTime::default())
    ///     .unwrap()
    ///     .with_seed(42);
    /// let tick = feed.generate(100.0).unwrap();
    /// assert_eq!(tick.open(), 100.0);
    /// assert!(tick.high() >= tick.open().max(tick.close()));
    /// ```
    pub fn new(start_price: f64, volatility: f64, step: Duration, start: DateTime<Utc>) -> Result<Self> {
        if !start_price.is_finite() || start_price <= 0.0 {
            return Err(Error::InvalidPrice(start_price));
        }
        if !(volatility > 0.0 && volatility < 1.0) {
            return Err(Error::InvalidVolatility(volatility));
        }
        let step = TimeDelta::from_std(step).map_err(|_| Error::InvalidInterval)?;
        if step <= TimeDelta::zero() {
            return Err(Error::InvalidInterval);
        }

        Ok(Self {
            rng: StdRng::from_os_rng(),
            volatility,
            start_price,
            next_at: start,
            step,
        })
    }

    /// Builds the feed described by the configuration, starting now.
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let feed = Self::new(config.feed.start_price, config.feed.volatility, config.interval(), Utc::now())?;
        Ok(match config.feed.seed {
            Some(seed) => feed.with_seed(seed),
            None => feed,
        })
    }

    /// Makes the walk reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn start_price(&self) -> f64 {
        self.start_price
    }

    /// Generates the candle following `last_close`.
    pub fn generate(&mut self, last_close: f64) -> Result<PriceTick> {
        let open = last_close;
        let drift: f64 = self.rng.random_range(-1.0..=1.0);
        let wick_up: f64 = self.rng.random_range(0.0..=0.5);
        let wick_down: f64 = self.rng.random_range(0.0..=0.5);

        let close = open * (1.0 + self.volatility * drift);
        let high = open.max(close) * (1.0 + self.volatility * wick_up);
        let low = open.min(close) * (1.0 - self.volatility * wick_down);

        let tick = PriceTickBuilder::builder()
            .timestamp(self.next_at)
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .build()?;
        self.next_at += self.step;
        Ok(tick)
    }
}

impl TickSource for SyntheticFeed {
    fn next_tick(&mut self, last_close: Option<f64>) -> impl Future<Output = Option<PriceTick>> + Send {
        let tick = self
            .generate(last_close.unwrap_or(self.start_price))
            .inspect_err(|e| tracing::warn!(error = %e, "Synthetic tick rejected"))
            .ok();
        async move { tick }
    }
}
