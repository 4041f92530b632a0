//! Price feed sources.
//!
//! A [`TickSource`] produces the ticks consumed by the [`Simulator`](crate::sim::Simulator):
//! - [`SyntheticFeed`]: bounded random walk, seedable.
//! - [`ReplayFeed`]: recorded ticks, replayed in order.
//! - `LiveFeed`: newest kline of a market data provider (feature `live`).

mod replay;
mod synthetic;

#[cfg(feature = "live")]
mod live;

use std::future::Future;

use crate::engine::PriceTick;

pub use replay::*;
pub use synthetic::*;

#[cfg(feature = "live")]
pub use live::*;

/// A stream of price ticks.
pub trait TickSource {
    /// Produces the tick that follows `last_close`.
    ///
    /// `None` means no new tick is available (exhausted replay, network failure, no newer kline).
    /// The caller then skips evaluation and keeps the last known price.
    fn next_tick(&mut self, last_close: Option<f64>) -> impl Future<Output = Option<PriceTick>> + Send;
}
