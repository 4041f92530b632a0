//! Performance metrics of a demo session.
//!
//! This module provides tools to calculate, over the closed trades of a book:
//! - Max drawdown
//! - Profit factor
//! - Sharpe ratio
//! - Win rate
//!
//! It needs to enable `metrics` feature to use it.

use std::fmt;

use crate::engine::*;

/// Trading metrics calculated from the close events of a session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    balance: f64,
    unrealized_pnl: f64,
    initial_balance: f64,
    trades: Vec<CloseEvent>,
}

impl From<&OrderBook> for Metrics {
    fn from(value: &OrderBook) -> Self {
        Self {
            balance: value.balance(),
            unrealized_pnl: value.unrealized_pnl(),
            initial_balance: value.initial_balance(),
            trades: value.history().to_vec(),
        }
    }
}

impl Metrics {
    /// Creates a new `Metrics` instance from closed trades, an initial balance, a final balance and the open P&L.
    pub fn new(trades: Vec<CloseEvent>, initial_balance: f64, balance: f64, unrealized_pnl: f64) -> Self {
        Self {
            trades,
            balance,
            unrealized_pnl,
            initial_balance,
        }
    }

    /// Returns the initial balance.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Returns the balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the P&L of orders still open.
    pub fn unrealized_pnl(&self) -> f64 {
        self.unrealized_pnl
    }

    /// Returns the closed trades.
    pub fn trades(&self) -> std::slice::Iter<'_, CloseEvent> {
        self.trades.iter()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Sum of every realized P&L.
    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    /// Computes the maximum drawdown of the realized balance, as a percentage.
    pub fn max_drawdown(&self) -> f64 {
        let mut max_peak = self.initial_balance;
        let mut max_drawdown = 0.0;

        for trade in &self.trades {
            if trade.balance > max_peak {
                max_peak = trade.balance;
            }
            let drawdown = (max_peak - trade.balance) / max_peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown * 100.0
    }

    /// Computes the profit factor (gross gains over gross losses).
    pub fn profit_factor(&self) -> f64 {
        let mut total_gains = 0.0;
        let mut total_losses = 0.0;

        for trade in &self.trades {
            if trade.pnl > 0.0 {
                total_gains += trade.pnl;
            } else {
                total_losses += trade.pnl.abs();
            }
        }

        if total_losses == 0.0 {
            return f64::INFINITY;
        }

        total_gains / total_losses
    }

    /// Computes the Sharpe ratio of per-trade balance returns.
    ///
    /// `risk_free_rate` is the per-trade risk-free return (e.g., 0.0 for simplicity).
    /// Undefined (NaN) without trades.
    pub fn sharpe_ratio(&self, risk_free_rate: f64) -> f64 {
        let mut returns = Vec::with_capacity(self.trades.len());
        let mut previous_balance = self.initial_balance;

        for trade in &self.trades {
            returns.push((trade.balance - previous_balance) / previous_balance);
            previous_balance = trade.balance;
        }

        let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
        let std_dev = (returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / returns.len() as f64).sqrt();

        (mean_return - risk_free_rate) / std_dev
    }

    /// Computes the win rate as a percentage of winning trades.
    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }

        let winning_trades = self.trades.iter().filter(|t| t.pnl > 0.0).count();
        (winning_trades as f64 / self.trades.len() as f64) * 100.0
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Demo Session Metrics ===")?;
        writeln!(f, "Initial Balance: {:.2}", self.initial_balance)?;
        writeln!(f, "Final Balance: {:.2}", self.balance)?;
        writeln!(f, "Realized P&L: {:.2}", self.realized_pnl())?;
        writeln!(f, "Unrealized P&L: {:.2}", self.unrealized_pnl)?;
        writeln!(f, "Trades: {}", self.trade_count())?;
        writeln!(f)?;
        writeln!(f, "Max Drawdown: {:.2}%", self.max_drawdown())?;
        writeln!(f, "Profit Factor: {:.2}", self.profit_factor())?;
        writeln!(f, "Sharpe Ratio (risk-free rate = 0.0): {:.2}", self.sharpe_ratio(0.0))?;
        write!(f, "Win Rate: {:.2}%", self.win_rate())
    }
}
