use chrono::{DateTime, Utc};

use crate::engine::OrderId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The order quantity is zero, negative or not a number.
    #[error("Quantity must be positive (got: {0})")]
    InvalidQuantity(f64),

    /// A price (entry, stop-loss, take-profit or exit) is not positive or not finite.
    #[error("Price must be positive and finite (got: {0})")]
    InvalidPrice(f64),

    /// A limit or stop order was placed without an entry price.
    #[error("A {0} order requires an entry price")]
    MissingEntryPrice(&'static str),

    /// The tick does not describe a valid candle.
    #[error("Invalid tick: open {open}, high {high}, low {low}, close {close}")]
    InvalidTick {
        /// Open price.
        open: f64,
        /// High price.
        high: f64,
        /// Low price.
        low: f64,
        /// Close price.
        close: f64,
    },

    /// The tick timestamp is not strictly after the previous one.
    #[error("Stale tick: {0} is not after {1}")]
    StaleTick(DateTime<Utc>, DateTime<Utc>),

    /// A market order was placed before any price was known.
    #[error("No market price yet: wait for the first tick")]
    NoMarketPrice,

    /// The order was not found in the book.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// The order exists but is still pending.
    #[error("Order {0} is pending, cancel it instead")]
    OrderNotOpen(OrderId),

    /// The order exists but is already open.
    #[error("Order {0} is open, close it instead")]
    OrderNotPending(OrderId),

    /// The initial balance is not positive.
    #[error("Balance must be positive (got: {0})")]
    NegZeroBalance(f64),

    /// A realized amount is not a finite number.
    #[error("Amount must be finite (got: {0})")]
    InvalidAmount(f64),

    /// Volatility must be within `(0, 1)`.
    #[error("Volatility must be between 0 and 1 exclusive (got: {0})")]
    InvalidVolatility(f64),

    /// The contract multiplier is not positive.
    #[error("Contract multiplier must be positive (got: {0})")]
    InvalidMultiplier(f64),

    /// The tick interval is zero.
    #[error("Tick interval must be greater than zero")]
    InvalidInterval,

    /// The kline interval is unknown, or longer than the tick interval of a live session.
    #[error("Invalid kline interval: {0}")]
    InvalidKlineInterval(String),

    /// Risk percent outside `(0, 100]`.
    #[error("Risk percent must be between 0 and 100 (got: {0})")]
    InvalidRisk(f64),

    /// A kline row from the market data provider could not be mapped.
    #[error("Malformed kline: {0}")]
    MalformedKline(String),

    /// The session task is gone.
    #[error("Session is closed")]
    SessionClosed,

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON serialization/deserialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error from the market data provider.
    #[cfg(feature = "live")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
