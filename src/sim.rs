//! One synchronous simulation step per tick.

use crate::engine::{CloseEvent, OrderBook, PriceTick};
use crate::errors::Result;
use crate::feed::{SyntheticFeed, TickSource};
use crate::settings::SimConfig;

/// Outcome of a [`Simulator::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// The evaluated tick, `None` when the source had nothing new.
    pub tick: Option<PriceTick>,
    /// Orders closed by this tick.
    pub closed: Vec<CloseEvent>,
}

/// A price source driving an order book.
#[derive(Debug, Clone)]
pub struct Simulator<S> {
    source: S,
    book: OrderBook,
    ticks: u64,
}

impl Simulator<SyntheticFeed> {
    /// Builds a synthetic simulation from the configuration.
    pub fn synthetic(config: &SimConfig) -> Result<Self> {
        let book = OrderBook::new(config.initial_balance, config.contract_multiplier)?;
        Ok(Self::new(SyntheticFeed::from_config(config)?, book))
    }
}

impl<S: TickSource> Simulator<S> {
    pub fn new(source: S, book: OrderBook) -> Self {
        Self { source, book, ticks: 0 }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of ticks evaluated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Pulls at most one tick from the source and evaluates it against the book.
    ///
    /// An empty source is not an error: the step is skipped and the last price kept.
    pub async fn step(&mut self) -> Result<Step> {
        let Some(tick) = self.source.next_tick(self.book.current_price()).await else {
            return Ok(Step::default());
        };

        let closed = self.book.on_tick(&tick)?;
        self.ticks += 1;
        Ok(Step {
            tick: Some(tick),
            closed,
        })
    }

    pub fn into_parts(self) -> (S, OrderBook) {
        (self.source, self.book)
    }
}
