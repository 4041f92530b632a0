use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// One price observation: an OHLC candle stamped with its open time.
///
/// Deserialization goes through [`PriceTickBuilder`], so a decoded tick always has a valid shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTick")]
pub struct PriceTick {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl PriceTick {
    /// Returns the tick timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns `true` when the close is above the open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

impl TryFrom<(DateTime<Utc>, f64, f64, f64, f64)> for PriceTick {
    type Error = Error;

    fn try_from((timestamp, open, high, low, close): (DateTime<Utc>, f64, f64, f64, f64)) -> Result<Self> {
        PriceTickBuilder::builder()
            .timestamp(timestamp)
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .build()
    }
}

#[derive(Deserialize)]
struct RawTick {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl TryFrom<RawTick> for PriceTick {
    type Error = Error;

    fn try_from(raw: RawTick) -> Result<Self> {
        Self::try_from((raw.timestamp, raw.open, raw.high, raw.low, raw.close))
    }
}

/// Builder for [`PriceTick`], validating the candle shape on [`build`](PriceTickBuilder::build).
#[derive(Debug, Default)]
pub struct PriceTickBuilder {
    timestamp: Option<DateTime<Utc>>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl PriceTickBuilder {
    /// Starts an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn open(mut self, open: f64) -> Self {
        self.open = open;
        self
    }

    pub fn high(mut self, high: f64) -> Self {
        self.high = high;
        self
    }

    pub fn low(mut self, low: f64) -> Self {
        self.low = low;
        self
    }

    pub fn close(mut self, close: f64) -> Self {
        self.close = close;
        self
    }

    /// Builds the tick.
    ///
    /// ### Returns
    /// The tick, or [`Error::InvalidTick`] when a price is not positive and finite,
    /// when `high < max(open, close)` or when `low > min(open, close)`.
    /// A missing timestamp defaults to the Unix epoch.
    pub fn build(self) -> Result<PriceTick> {
        let Self {
            timestamp,
            open,
            high,
            low,
            close,
        } = self;

        let positive = [open, high, low, close].iter().all(|p| p.is_finite() && *p > 0.0);
        if !positive || high < open.max(close) || low > open.min(close) {
            return Err(Error::InvalidTick { open, high, low, close });
        }

        Ok(PriceTick {
            timestamp: timestamp.unwrap_or_default(),
            open,
            high,
            low,
            close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_valid_tick() {
        let tick = PriceTickBuilder::builder()
            .timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .open(100.0)
            .high(105.0)
            .low(98.0)
            .close(102.0)
            .build()
            .unwrap();

        assert_eq!(tick.open(), 100.0);
        assert_eq!(tick.high(), 105.0);
        assert_eq!(tick.low(), 98.0);
        assert_eq!(tick.close(), 102.0);
        assert!(tick.is_bullish());
        assert_eq!(tick.timestamp().timestamp(), 1_700_000_000);
    }

    #[test]
    fn reject_high_below_body() {
        let result = PriceTick::try_from((DateTime::default(), 100.0, 101.0, 95.0, 103.0));
        assert!(matches!(result, Err(Error::InvalidTick { .. })));
    }

    #[test]
    fn reject_low_above_body() {
        let result = PriceTick::try_from((DateTime::default(), 100.0, 110.0, 100.5, 103.0));
        assert!(matches!(result, Err(Error::InvalidTick { .. })));
    }

    #[test]
    fn reject_non_positive_or_nan_prices() {
        let result = PriceTick::try_from((DateTime::default(), 0.0, 1.0, 0.0, 1.0));
        assert!(matches!(result, Err(Error::InvalidTick { .. })));

        let result = PriceTick::try_from((DateTime::default(), f64::NAN, 1.0, 0.5, 1.0));
        assert!(matches!(result, Err(Error::InvalidTick { .. })));
    }

    #[test]
    fn decode_validates_shape() {
        let json = r#"{"timestamp":"2023-11-14T22:13:20Z","open":100.0,"high":101.0,"low":99.0,"close":100.5}"#;
        let tick: PriceTick = serde_json::from_str(json).unwrap();
        assert_eq!(tick.close(), 100.5);

        let json = r#"{"timestamp":"2023-11-14T22:13:20Z","open":100.0,"high":99.0,"low":98.0,"close":100.5}"#;
        assert!(serde_json::from_str::<PriceTick>(json).is_err());
    }

    #[test]
    fn flat_tick_is_valid() {
        let tick = PriceTick::try_from((DateTime::default(), 100.0, 100.0, 100.0, 100.0)).unwrap();
        assert!(!tick.is_bullish());
    }
}
