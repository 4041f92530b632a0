//! Core simulation components.
//!
//! This module provides the fundamental types of a demo account:
//! - `PriceTick`: OHLC candle consumed by the book.
//! - `Order`: Market, limit and stop orders with optional stop-loss/take-profit.
//! - `OrderBook`: Open and pending orders, evaluated on every tick.
//! - `Ledger`: Virtual balance fed by realized P&L.

mod book;
mod ledger;
mod order;
mod tick;

pub use book::*;
pub use ledger::*;
pub use order::*;
pub use tick::*;
