//! Lot-size calculator.

use crate::PercentCalculus;
use crate::errors::{Error, Result};

/// Returns the quantity that loses `risk_percent` of `balance` if the stop-loss is hit.
///
/// ### Arguments
/// * `balance` - Account balance.
/// * `risk_percent` - Share of the balance put at risk (e.g. 2.0 for 2%).
/// * `entry` - Planned entry price.
/// * `stop_loss` - Planned stop-loss price.
/// * `multiplier` - Contract multiplier.
///
/// ### Example
/// ```rust
/// use dts_rs::sizing::position_size;
///
/// // risk 2% of 10k with a 5 point stop: 200 / 5 = 40 units
/// let quantity = position_size(10_000.0, 2.0, 100.0, 95.0, 1.0).unwrap();
/// assert_eq!(quantity, 40.0);
/// ```
pub fn position_size(balance: f64, risk_percent: f64, entry: f64, stop_loss: f64, multiplier: f64) -> Result<f64> {
    if !balance.is_finite() || balance <= 0.0 {
        return Err(Error::NegZeroBalance(balance));
    }
    if !(risk_percent > 0.0 && risk_percent <= 100.0) {
        return Err(Error::InvalidRisk(risk_percent));
    }
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(Error::InvalidMultiplier(multiplier));
    }
    for price in [entry, stop_loss] {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidPrice(price));
        }
    }

    let distance = (entry - stop_loss).abs();
    if distance == 0.0 {
        return Err(Error::InvalidPrice(stop_loss));
    }

    Ok(balance.how_many(risk_percent) / (distance * multiplier))
}
