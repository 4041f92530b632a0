use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Virtual balance of a demo account.
///
/// The balance only moves when P&L is realized. Unrealized P&L of open orders is
/// tracked beside it and never folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    // Seed balance used for reset
    initial_balance: f64,
    // Seed plus every realized P&L
    balance: f64,
    // Mark-to-market P&L of open orders
    unrealized_pnl: f64,
    // Number of realized entries
    realized_count: usize,
}

impl Ledger {
    /// Creates a ledger seeded with `balance`.
    /// Non-positive seeds are rejected.
    pub fn new(balance: f64) -> Result<Self> {
        if !balance.is_finite() || balance <= 0.0 {
            return Err(Error::NegZeroBalance(balance));
        }

        Ok(Self {
            balance,
            unrealized_pnl: 0.0,
            realized_count: 0,
            initial_balance: balance,
        })
    }

    /// Returns the seed balance.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Returns the balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the unrealized P&L of open orders.
    pub fn unrealized_pnl(&self) -> f64 {
        self.unrealized_pnl
    }

    /// Returns the equity (balance plus unrealized P&L).
    pub fn total_balance(&self) -> f64 {
        self.balance + self.unrealized_pnl
    }

    /// Returns the sum of everything realized so far.
    pub fn realized_pnl(&self) -> f64 {
        self.balance - self.initial_balance
    }

    /// Returns how many P&L entries were applied.
    pub fn realized_count(&self) -> usize {
        self.realized_count
    }

    /// Adds a realized P&L to the balance. No clamping: the balance may go negative.
    ///
    /// Fails with [`Error::InvalidAmount`], leaving the balance untouched, when `amount`
    /// or the resulting balance is not finite.
    pub fn apply_realized_pnl(&mut self, amount: f64) -> Result<f64> {
        self.balance = self.checked_balance(amount)?;
        self.realized_count += 1;
        Ok(self.balance)
    }

    fn checked_balance(&self, amount: f64) -> Result<f64> {
        let balance = self.balance + amount;
        if !amount.is_finite() || !balance.is_finite() {
            return Err(Error::InvalidAmount(amount));
        }
        Ok(balance)
    }

    /// Updates the unrealized P&L.
    pub(crate) fn set_unrealized_pnl(&mut self, pnl: f64) {
        self.unrealized_pnl = pnl;
    }

    /// Resets the ledger to its seed balance.
    pub(crate) fn reset(&mut self) {
        self.unrealized_pnl = 0.0;
        self.realized_count = 0;
        self.balance = self.initial_balance;
    }
}

#[cfg(test)]
#[test]
fn new_ledger_valid_balance() {
    let ledger = Ledger::new(100.0).unwrap();
    assert_eq!(ledger.balance(), 100.0);
    assert_eq!(ledger.initial_balance(), 100.0);
    assert_eq!(ledger.total_balance(), 100.0);
    assert_eq!(ledger.realized_count(), 0);
}

#[cfg(test)]
#[test]
fn new_ledger_invalid_balance() {
    let result = Ledger::new(0.0);
    assert!(matches!(result, Err(Error::NegZeroBalance(_))));

    let result = Ledger::new(-10.0);
    assert!(matches!(result, Err(Error::NegZeroBalance(_))));

    let result = Ledger::new(f64::NAN);
    assert!(matches!(result, Err(Error::NegZeroBalance(_))));
}

#[cfg(test)]
#[test]
fn apply_is_additive() {
    let mut ledger = Ledger::new(1000.0).unwrap();
    let pnls = [12.5, -40.0, 3.25, -0.75];
    for pnl in pnls {
        ledger.apply_realized_pnl(pnl).unwrap();
    }
    assert_eq!(ledger.balance(), 1000.0 + pnls.iter().sum::<f64>());
    assert_eq!(ledger.realized_pnl(), pnls.iter().sum::<f64>());
    assert_eq!(ledger.realized_count(), 4);
}

#[cfg(test)]
#[test]
fn balance_can_go_negative() {
    let mut ledger = Ledger::new(100.0).unwrap();
    let balance = ledger.apply_realized_pnl(-250.0).unwrap();
    assert_eq!(balance, -150.0);
}

#[cfg(test)]
#[test]
fn reject_non_finite_amount() {
    let mut ledger = Ledger::new(100.0).unwrap();
    assert!(matches!(ledger.apply_realized_pnl(f64::NAN), Err(Error::InvalidAmount(_))));
    assert!(matches!(ledger.apply_realized_pnl(f64::INFINITY), Err(Error::InvalidAmount(_))));
    assert_eq!(ledger.balance(), 100.0);
}

#[cfg(test)]
#[test]
fn reject_overflowing_balance() {
    let mut ledger = Ledger::new(100.0).unwrap();
    ledger.apply_realized_pnl(f64::MAX / 2.0).unwrap();
    ledger.apply_realized_pnl(f64::MAX / 2.0).unwrap();

    let before = ledger.balance();
    assert!(matches!(ledger.apply_realized_pnl(f64::MAX / 2.0), Err(Error::InvalidAmount(_))));
    assert_eq!(ledger.balance(), before);
    assert_eq!(ledger.realized_count(), 2);
}

#[cfg(test)]
#[test]
fn unrealized_pnl_does_not_touch_balance() {
    let mut ledger = Ledger::new(100.0).unwrap();
    ledger.set_unrealized_pnl(10.0);
    assert_eq!(ledger.unrealized_pnl(), 10.0);
    assert_eq!(ledger.total_balance(), 110.0);
    assert_eq!(ledger.balance(), 100.0);

    ledger.set_unrealized_pnl(-5.0);
    assert_eq!(ledger.total_balance(), 95.0);
    assert_eq!(ledger.balance(), 100.0);
}

#[cfg(test)]
#[test]
fn reset_ledger() {
    let mut ledger = Ledger::new(100.0).unwrap();
    ledger.apply_realized_pnl(20.0).unwrap();
    ledger.set_unrealized_pnl(3.0);

    ledger.reset();
    assert_eq!(ledger.balance(), 100.0);
    assert_eq!(ledger.total_balance(), 100.0);
    assert_eq!(ledger.realized_count(), 0);
}
