//! # DTS: Demo Trading Simulator
//!
//! **DTS** simulates a demo trading account against a price feed. Prices come from a seeded
//! random walk, a recorded series or a live exchange; orders carry optional stop-loss and
//! take-profit levels that close them automatically on the tick that crosses them.
//!
//! ## Core Components
//! | Component   | Description                                                                                     |
//! |-------------|-------------------------------------------------------------------------------------------------|
//! | **`PriceTick`** | One OHLC observation for a single time step.                                                |
//! | **`Order`**  | Market, limit or stop order with optional exit rules.                                          |
//! | **`Ledger`** | Tracks balance, realized and unrealized P&L.                                                   |
//! | **`OrderBook`** | Places, cancels and closes orders; evaluates exit rules on every tick.                      |
//! | **`TickSource`** | Synthetic, replayed or live price feed.                                                    |
//! | **`Simulator`** | Pulls ticks from a source into a book, one step at a time.                                  |
//! | **`SessionHandle`** | Timer-driven session with pause, resume and snapshots.                                  |
//! | **`Metrics`** | Calculates performance metrics: P&L, drawdown, Sharpe ratio, win rate.                        |
//!
//! ## Order Types & Exit Rules
//! | Order Type               | Description                                                                                     |
//! |--------------------------|-------------------------------------------------------------------------------------------------|
//! | **Market Order**         | Opens immediately at the current price.                                                        |
//! | **Limit / Stop Order**   | Stays pending at its entry price until cancelled.                                              |
//! | **Stop-Loss**            | Closes the order to limit losses.                                                              |
//! | **Take-Profit**          | Closes the order when a target price is reached.                                               |
//!
//! P&L of an order is `(exit - entry) * quantity * multiplier`, negated for sells.
//!
//! ## Getting Started
//! ### 1. Step a simulation by hand:
//! ```rust
//! use dts_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SimConfig::default();
//!     let mut sim = Simulator::synthetic(&config)?;
//!
//!     // A market order needs a price: pull the first tick
//!     sim.step().await?;
//!     let price = sim.book().current_price().unwrap_or_default();
//!
//!     let request = OrderRequest::market(OrderSide::Buy, 1.0)
//!         .stop_loss(price.subpercent(1.0))
//!         .take_profit(price.addpercent(2.0));
//!     sim.book_mut().place_order(request)?;
//!
//!     for _ in 0..100 {
//!         let step = sim.step().await?;
//!         for event in step.closed {
//!             println!("{} closed by {}: {:.2}", event.order.id(), event.reason, event.pnl);
//!         }
//!     }
//!
//!     println!("Balance: {:.2}", sim.book().balance());
//!     Ok(())
//! }
//! ```
//!
//! ### 2. Run a timer-driven session:
//! ```rust
//! use std::time::Duration;
//! use dts_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sim = Simulator::synthetic(&SimConfig::default())?;
//!     let session = session::spawn(sim, Duration::from_millis(10))?;
//!     let mut events = session.subscribe();
//!
//!     while let Ok(event) = events.recv().await {
//!         if let SessionEvent::Tick(_) = event {
//!             break;
//!         }
//!     }
//!     session.pause().await?;
//!     let snapshot = session.snapshot().await?;
//!     assert!(snapshot.paused);
//!
//!     session.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//! [`SimConfig`](settings::SimConfig) loads from an optional TOML file, then from `DTS_*`
//! environment variables (`DTS_INITIAL_BALANCE`, `DTS_FEED__VOLATILITY`, ...).
//!
//! ## Logging
//! Every state change is logged with [`tracing`](https://crates.io/crates/tracing). The `dts`
//! binary installs a subscriber filtered by `RUST_LOG`.
//!
//! ## Feature Flags
//! | Feature   | Description                                                                                     |
//! |-----------|-------------------------------------------------------------------------------------------------|
//! | `metrics` | Performance metrics over closed trades (default).                                               |
//! | `live`    | Live price feed from an exchange REST API with `reqwest` (default).                             |
//! | `wasm`    | Entropy source for `wasm32` targets.                                                            |
//!
//! ## License
//! MIT

/// Core trading components: ticks, orders, ledger and order book.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Price sources.
pub mod feed;

/// Timer-driven sessions.
pub mod session;

/// Simulation settings.
pub mod settings;

/// Stepping a feed into a book.
pub mod sim;

/// Position sizing from risk.
pub mod sizing;

/// Performance metrics: drawdown, Sharpe ratio, win rate, etc.
#[cfg(feature = "metrics")]
pub mod metrics;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::PercentCalculus;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::feed::*;
    pub use crate::session::{self, SessionEvent, SessionHandle, Snapshot};
    pub use crate::settings::*;
    pub use crate::sim::*;
    pub use crate::sizing::*;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for performing percentage-based calculations.
///
/// This trait provides methods to add, subtract, and calculate percentages
/// for numeric types, enabling common financial calculations.
pub trait PercentCalculus<Rhs = Self> {
    /// Adds a percentage to the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to add (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value increased by the given percentage.
    fn addpercent(self, rhs: Rhs) -> Self;

    /// Subtracts a percentage from the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to subtract (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value decreased by the given percentage.
    fn subpercent(self, rhs: Rhs) -> Self;

    /// Calculates the absolute value of a percentage.
    ///
    /// ### Arguments
    /// * `percent` - The percentage to calculate (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The absolute value of the given percentage.
    fn how_many(self, percent: Self) -> Self;

    /// Calculates the percentage change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The percentage change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl PercentCalculus for f64 {
    fn addpercent(self, percent: Self) -> Self {
        self.add(self.mul(percent.div(100.0)))
    }

    fn subpercent(self, percent: Self) -> Self {
        self.sub(self.mul(percent.div(100.0)))
    }

    fn how_many(self, percent: Self) -> Self {
        percent.mul(self.div(100.0))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }
}
