use std::collections::{VecDeque, vec_deque::Iter};

use chrono::{DateTime, Utc};

use super::order::check_price;
use crate::engine::*;
use crate::errors::{Error, Result};

/// Virtual order book of a demo account.
///
/// The book owns every open and pending order together with the [`Ledger`] that
/// accumulates realized P&L. Each [`PriceTick`] moves the current price and closes
/// the open orders whose stop-loss or take-profit has been crossed.
#[derive(Debug, Clone)]
pub struct OrderBook {
    ledger: Ledger,
    multiplier: f64,
    next_id: u64,
    current_price: Option<f64>,
    last_tick_at: Option<DateTime<Utc>>,
    open: VecDeque<Order>,
    pending: VecDeque<Order>,
    history: Vec<CloseEvent>,
}

impl std::ops::Deref for OrderBook {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

impl OrderBook {
    /// Creates an empty book.
    ///
    /// ### Arguments
    /// * `initial_balance` - Seed balance of the ledger.
    /// * `multiplier` - Contract multiplier applied to every P&L (1.0 for spot).
    ///
    /// ### Example
    /// ```rust
    /// use dts_rs::prelude::*;
    ///
    /// let book = OrderBook::new(10_000.0, 1.0).unwrap();
    /// assert_eq!(book.balance(), 10_000.0);
    /// assert!(book.current_price().is_none());
    /// ```
    pub fn new(initial_balance: f64, multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(Error::InvalidMultiplier(multiplier));
        }

        Ok(Self {
            multiplier,
            next_id: 1,
            current_price: None,
            last_tick_at: None,
            open: VecDeque::new(),
            pending: VecDeque::new(),
            history: Vec::new(),
            ledger: Ledger::new(initial_balance)?,
        })
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns the contract multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Returns the close of the last evaluated tick.
    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    /// Returns the timestamp of the last evaluated tick.
    pub fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        self.last_tick_at
    }

    /// Returns an iterator over the open orders.
    pub fn open_orders(&self) -> Iter<'_, Order> {
        self.open.iter()
    }

    /// Returns an iterator over the pending orders.
    pub fn pending_orders(&self) -> Iter<'_, Order> {
        self.pending.iter()
    }

    /// Looks up an open or pending order.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.open.iter().chain(self.pending.iter()).find(|o| o.id() == id)
    }

    /// Returns every close event so far, oldest first.
    pub fn history(&self) -> &[CloseEvent] {
        &self.history
    }

    /// Places a new order.
    ///
    /// Market orders open immediately at the current price. Limit and stop orders
    /// are kept pending at their entry price.
    ///
    /// ### Returns
    /// The placed order, or an error. The book is left untouched on error.
    ///
    /// ### Example
    /// ```rust
    /// use chrono::DateTime;
    /// use dts_rs::prelude::*;
    ///
    /// let mut book = OrderBook::new(1_000.0, 1.0).unwrap();
    /// let tick = PriceTick::try_from((DateTime::default(), 100.0, 100.0, 100.0, 100.0)).unwrap();
    /// book.on_tick(&tick).unwrap();
    ///
    /// let order = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
    /// assert_eq!(order.entry_price(), 100.0);
    /// assert!(order.is_open());
    /// ```
    pub fn place_order(&mut self, request: OrderRequest) -> Result<Order> {
        request.validate()?;
        let market_price = match request.kind {
            OrderKind::Market => self.current_price.ok_or(Error::NoMarketPrice)?,
            _ => request.entry_price.ok_or(Error::MissingEntryPrice("pending"))?,
        };

        let highest = [Some(market_price), request.stop_loss, request.take_profit]
            .into_iter()
            .flatten()
            .fold(0.0, f64::max);
        if !(request.quantity * highest * self.multiplier).is_finite() {
            return Err(Error::InvalidQuantity(request.quantity));
        }

        let id = OrderId(self.next_id);
        self.next_id += 1;
        let order = Order::new(id, &request, market_price, self.now());

        tracing::info!(
            order = %id,
            side = %order.side(),
            kind = ?order.kind(),
            price = order.entry_price(),
            quantity = order.quantity(),
            "Order placed"
        );

        if order.is_open() {
            self.open.push_back(order);
            self.refresh_unrealized();
        } else {
            self.pending.push_back(order);
        }
        Ok(order)
    }

    /// Cancels a pending order. The balance is not touched.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Order> {
        match self.pending.iter().position(|o| o.id() == id) {
            Some(idx) => {
                let order = self.pending.remove(idx).ok_or(Error::OrderNotFound(id))?;
                tracing::info!(order = %id, "Pending order cancelled");
                Ok(order)
            }
            None if self.open.iter().any(|o| o.id() == id) => Err(Error::OrderNotPending(id)),
            None => Err(Error::OrderNotFound(id)),
        }
    }

    /// Closes an open order at the current price.
    ///
    /// ### Returns
    /// The realized profit/loss, or an error.
    pub fn close_order(&mut self, id: OrderId) -> Result<f64> {
        let price = self.current_price.ok_or(Error::NoMarketPrice)?;
        self.close_order_at(id, price)
    }

    /// Closes an open order at `exit_price`.
    ///
    /// ### Returns
    /// The realized profit/loss, or an error.
    ///
    /// ### Example
    /// ```rust
    /// use chrono::DateTime;
    /// use dts_rs::prelude::*;
    ///
    /// let mut book = OrderBook::new(1_000.0, 1.0).unwrap();
    /// let tick = PriceTick::try_from((DateTime::default(), 100.0, 100.0, 100.0, 100.0)).unwrap();
    /// book.on_tick(&tick).unwrap();
    ///
    /// let order = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
    /// let pnl = book.close_order_at(order.id(), 105.0).unwrap();
    /// assert_eq!(pnl, 5.0);
    /// assert_eq!(book.balance(), 1_005.0);
    /// ```
    pub fn close_order_at(&mut self, id: OrderId, exit_price: f64) -> Result<f64> {
        check_price(exit_price)?;
        let idx = match self.open.iter().position(|o| o.id() == id) {
            Some(idx) => idx,
            None if self.pending.iter().any(|o| o.id() == id) => return Err(Error::OrderNotOpen(id)),
            None => return Err(Error::OrderNotFound(id)),
        };

        self.check_settlement([(&self.open[idx], exit_price)])?;

        let now = self.now();
        let order = self.open.remove(idx).ok_or(Error::OrderNotFound(id))?;
        let event = self.realize(order, exit_price, CloseReason::Manual, now)?;
        self.refresh_unrealized();
        Ok(event.pnl)
    }

    /// Closes every open order at the current price.
    pub fn close_all(&mut self) -> Result<Vec<CloseEvent>> {
        let Some(price) = self.current_price else {
            return Ok(Vec::new());
        };

        self.check_settlement(self.open.iter().map(|o| (o, price)))?;

        let now = self.now();
        let mut events = Vec::with_capacity(self.open.len());
        while let Some(order) = self.open.pop_front() {
            events.push(self.realize(order, price, CloseReason::Manual, now)?);
        }
        self.refresh_unrealized();
        Ok(events)
    }

    /// Evaluates a tick against every open order.
    ///
    /// The tick close becomes the current price. Open orders whose stop-loss or
    /// take-profit is crossed by the close are closed at the trigger price. Pending
    /// orders are left as they are.
    ///
    /// The tick is all or nothing: on error neither the orders, the balance nor the
    /// current price change.
    ///
    /// ### Returns
    /// The close events produced by this tick, [`Error::StaleTick`] when the tick
    /// is not strictly newer than the previous one, or [`Error::InvalidAmount`] when
    /// the triggered P&L would overflow the balance.
    pub fn on_tick(&mut self, tick: &PriceTick) -> Result<Vec<CloseEvent>> {
        let timestamp = tick.timestamp();
        if let Some(last) = self.last_tick_at {
            if timestamp <= last {
                return Err(Error::StaleTick(timestamp, last));
            }
        }

        let close = tick.close();
        let exits = self
            .open
            .iter()
            .filter_map(|o| o.triggered_exit(close).map(|(reason, exit_price)| (*o, reason, exit_price)))
            .collect::<Vec<_>>();
        self.check_settlement(exits.iter().map(|(o, _, exit_price)| (o, *exit_price)))?;

        self.last_tick_at = Some(timestamp);
        self.current_price = Some(close);
        self.open.retain(|o| o.triggered_exit(close).is_none());

        let mut events = Vec::with_capacity(exits.len());
        for (order, reason, exit_price) in exits {
            events.push(self.realize(order, exit_price, reason, timestamp)?);
        }
        self.refresh_unrealized();

        tracing::debug!(
            close,
            open = self.open.len(),
            closed = events.len(),
            equity = self.ledger.total_balance(),
            "Tick evaluated"
        );
        Ok(events)
    }

    /// Resets the book to its seeded state.
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.next_id = 1;
        self.current_price = None;
        self.last_tick_at = None;
        self.open = VecDeque::new();
        self.pending = VecDeque::new();
        self.history = Vec::new();
    }

    fn realize(&mut self, order: Order, exit_price: f64, reason: CloseReason, timestamp: DateTime<Utc>) -> Result<CloseEvent> {
        let pnl = order.pnl_at(exit_price, self.multiplier);
        let balance = self.ledger.apply_realized_pnl(pnl)?;
        let event = CloseEvent {
            order,
            exit_price,
            pnl,
            reason,
            timestamp,
            balance,
        };

        tracing::info!(
            order = %order.id(),
            %reason,
            exit_price,
            pnl,
            balance,
            "Order closed"
        );
        self.history.push(event);
        Ok(event)
    }

    // Realizing `exits` in order keeps every P&L and the balance finite.
    fn check_settlement<'a>(&self, exits: impl IntoIterator<Item = (&'a Order, f64)>) -> Result<()> {
        let mut ledger = self.ledger.clone();
        for (order, exit_price) in exits {
            ledger.apply_realized_pnl(order.pnl_at(exit_price, self.multiplier))?;
        }
        Ok(())
    }

    fn refresh_unrealized(&mut self) {
        let unrealized = match self.current_price {
            Some(price) => self.open.iter().map(|o| o.pnl_at(price, self.multiplier)).sum(),
            None => 0.0,
        };
        self.ledger.set_unrealized_pnl(unrealized);
    }

    fn now(&self) -> DateTime<Utc> {
        self.last_tick_at.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(secs: i64, close: f64) -> PriceTick {
        let timestamp = DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap();
        PriceTick::try_from((timestamp, close, close, close, close)).unwrap()
    }

    fn book_at(price: f64) -> OrderBook {
        let mut book = OrderBook::new(1000.0, 1.0).unwrap();
        book.on_tick(&tick(0, price)).unwrap();
        book
    }

    fn bracket(side: OrderSide, sl: f64, tp: f64) -> OrderRequest {
        OrderRequest::market(side, 1.0).stop_loss(sl).take_profit(tp)
    }

    #[test]
    fn reject_invalid_multiplier() {
        assert!(matches!(OrderBook::new(1000.0, 0.0), Err(Error::InvalidMultiplier(_))));
        assert!(matches!(OrderBook::new(1000.0, f64::NAN), Err(Error::InvalidMultiplier(_))));
        assert!(matches!(OrderBook::new(0.0, 1.0), Err(Error::NegZeroBalance(_))));
    }

    #[test]
    fn market_order_needs_a_price() {
        let mut book = OrderBook::new(1000.0, 1.0).unwrap();
        let result = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0));
        assert!(matches!(result, Err(Error::NoMarketPrice)));
        assert_eq!(book.open_orders().count(), 0);
    }

    #[test]
    fn invalid_quantity_leaves_book_untouched() {
        let mut book = book_at(100.0);
        for quantity in [0.0, -1.0, f64::NAN] {
            let result = book.place_order(OrderRequest::market(OrderSide::Buy, quantity));
            assert!(matches!(result, Err(Error::InvalidQuantity(_))));
        }
        assert_eq!(book.open_orders().count(), 0);
        assert_eq!(book.pending_orders().count(), 0);
        assert_eq!(book.balance(), 1000.0);

        // ids are not consumed by rejected orders
        let order = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
        assert_eq!(order.id(), OrderId(1));
    }

    #[test]
    fn ids_are_unique() {
        let mut book = book_at(100.0);
        let a = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
        let b = book.place_order(OrderRequest::limit(OrderSide::Buy, 1.0, 90.0)).unwrap();
        let c = book.place_order(OrderRequest::market(OrderSide::Sell, 1.0)).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn scenario_buy_stop_loss() {
        let mut book = book_at(100.0);
        let order = book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        let events = book.on_tick(&tick(1, 99.0)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order.id(), order.id());
        assert_eq!(events[0].reason, CloseReason::StopLoss);
        assert_eq!(events[0].exit_price, 99.0);
        assert!(events[0].pnl < 0.0);
        assert_eq!(book.balance(), 999.0);
        assert_eq!(book.open_orders().count(), 0);
    }

    #[test]
    fn scenario_buy_take_profit() {
        let mut book = book_at(100.0);
        book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        let events = book.on_tick(&tick(1, 101.0)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, CloseReason::TakeProfit);
        assert_eq!(events[0].exit_price, 101.0);
        assert!(events[0].pnl > 0.0);
        assert_eq!(book.balance(), 1001.0);
    }

    #[test]
    fn scenario_buy_stays_open_between_brackets() {
        let mut book = book_at(100.0);
        book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        let events = book.on_tick(&tick(1, 100.5)).unwrap();
        assert!(events.is_empty());
        assert_eq!(book.open_orders().count(), 1);
        assert_eq!(book.balance(), 1000.0);
        assert_eq!(book.unrealized_pnl(), 0.5);
        assert_eq!(book.total_balance(), 1000.5);
    }

    #[test]
    fn closes_at_trigger_price_not_tick_close() {
        let mut book = book_at(100.0);
        book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        // gap down through the stop
        let events = book.on_tick(&tick(1, 95.0)).unwrap();
        assert_eq!(events[0].exit_price, 99.0);
        assert_eq!(events[0].pnl, -1.0);
    }

    #[test]
    fn scenario_sell_brackets() {
        let mut book = book_at(100.0);
        book.place_order(bracket(OrderSide::Sell, 102.0, 97.0)).unwrap();
        book.place_order(bracket(OrderSide::Sell, 101.0, 90.0)).unwrap();

        let events = book.on_tick(&tick(1, 101.0)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, CloseReason::StopLoss);
        assert_eq!(events[0].pnl, -1.0);

        let events = book.on_tick(&tick(2, 96.0)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, CloseReason::TakeProfit);
        assert_eq!(events[0].exit_price, 97.0);
        assert_eq!(events[0].pnl, 3.0);
        assert_eq!(book.balance(), 1002.0);
    }

    #[test]
    fn stop_loss_takes_precedence() {
        let mut book = book_at(100.0);
        // both brackets on the wrong side: the next close crosses both
        book.place_order(bracket(OrderSide::Buy, 100.5, 99.5)).unwrap();

        let events = book.on_tick(&tick(1, 100.0)).unwrap();
        assert_eq!(events[0].reason, CloseReason::StopLoss);
        assert_eq!(events[0].exit_price, 100.5);
    }

    #[test]
    fn scenario_immediate_close() {
        let mut book = OrderBook::new(1000.0, 10.0).unwrap();
        book.on_tick(&tick(0, 100.0)).unwrap();

        let order = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
        let pnl = book.close_order_at(order.id(), 105.0).unwrap();

        assert_eq!(pnl, 50.0);
        assert_eq!(book.balance(), 1050.0);
        assert_eq!(book.history().len(), 1);
        assert_eq!(book.history()[0].reason, CloseReason::Manual);
    }

    #[test]
    fn close_at_market_price() {
        let mut book = book_at(100.0);
        let order = book.place_order(OrderRequest::market(OrderSide::Sell, 2.0)).unwrap();
        book.on_tick(&tick(1, 98.0)).unwrap();

        let pnl = book.close_order(order.id()).unwrap();
        assert_eq!(pnl, 4.0);
        assert_eq!(book.unrealized_pnl(), 0.0);
    }

    #[test]
    fn close_unknown_or_pending_order() {
        let mut book = book_at(100.0);
        let pending = book.place_order(OrderRequest::stop(OrderSide::Buy, 1.0, 110.0)).unwrap();

        assert!(matches!(book.close_order(OrderId(42)), Err(Error::OrderNotFound(_))));
        assert!(matches!(book.close_order(pending.id()), Err(Error::OrderNotOpen(_))));
        assert!(matches!(book.close_order_at(pending.id(), -1.0), Err(Error::InvalidPrice(_))));
    }

    #[test]
    fn pending_orders_are_not_evaluated() {
        let mut book = book_at(100.0);
        let order = OrderRequest::limit(OrderSide::Buy, 1.0, 95.0).stop_loss(90.0).take_profit(99.0);
        let pending = book.place_order(order).unwrap();
        assert_eq!(pending.status(), OrderStatus::Pending);

        for (i, close) in [95.0, 89.0, 120.0].into_iter().enumerate() {
            let events = book.on_tick(&tick(i as i64 + 1, close)).unwrap();
            assert!(events.is_empty());
        }
        assert_eq!(book.pending_orders().count(), 1);
        assert_eq!(book.balance(), 1000.0);
        assert_eq!(book.unrealized_pnl(), 0.0);
    }

    #[test]
    fn cancel_pending_order() {
        let mut book = book_at(100.0);
        let pending = book.place_order(OrderRequest::limit(OrderSide::Sell, 1.0, 105.0)).unwrap();
        let open = book.place_order(OrderRequest::market(OrderSide::Sell, 1.0)).unwrap();

        assert!(matches!(book.cancel_order(open.id()), Err(Error::OrderNotPending(_))));
        let cancelled = book.cancel_order(pending.id()).unwrap();
        assert_eq!(cancelled, pending);
        assert!(matches!(book.cancel_order(pending.id()), Err(Error::OrderNotFound(_))));
        assert_eq!(book.balance(), 1000.0);
    }

    #[test]
    fn stale_tick_is_rejected() {
        let mut book = book_at(100.0);
        book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        let result = book.on_tick(&tick(0, 50.0));
        assert!(matches!(result, Err(Error::StaleTick(_, _))));
        assert_eq!(book.current_price(), Some(100.0));
        assert_eq!(book.open_orders().count(), 1);
    }

    #[test]
    fn balance_is_seed_plus_realized() {
        let mut book = book_at(100.0);
        let mut realized = 0.0;

        for i in 0..5 {
            let side = if i % 2 == 0 { OrderSide::Buy } else { OrderSide::Sell };
            let order = book.place_order(OrderRequest::market(side, 1.5)).unwrap();
            book.on_tick(&tick(i + 1, 100.0 + i as f64)).unwrap();
            realized += book.close_order(order.id()).unwrap();
        }

        assert_eq!(book.balance(), 1000.0 + realized);
        let from_history: f64 = book.history().iter().map(|e| e.pnl).sum();
        assert_eq!(realized, from_history);
    }

    #[test]
    fn close_all_orders() {
        let mut book = book_at(100.0);
        book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
        book.place_order(OrderRequest::market(OrderSide::Sell, 3.0)).unwrap();
        book.on_tick(&tick(1, 102.0)).unwrap();

        let events = book.close_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(book.balance(), 1000.0 + 2.0 - 6.0);
        assert_eq!(book.open_orders().count(), 0);
    }

    #[test]
    fn reject_quantity_with_unbounded_pnl() {
        let mut book = OrderBook::new(1000.0, 10.0).unwrap();
        book.on_tick(&tick(0, 100.0)).unwrap();
        book.place_order(bracket(OrderSide::Buy, 99.0, 101.0)).unwrap();

        let huge = OrderRequest::market(OrderSide::Buy, 1e308).stop_loss(99.0);
        assert!(matches!(book.place_order(huge), Err(Error::InvalidQuantity(_))));
        let huge = OrderRequest::limit(OrderSide::Sell, 1e306, 50.0).take_profit(1e5);
        assert!(matches!(book.place_order(huge), Err(Error::InvalidQuantity(_))));

        book.place_order(bracket(OrderSide::Sell, 101.0, 99.0)).unwrap();
        assert_eq!(book.open_orders().count(), 2);
        assert_eq!(book.pending_orders().count(), 0);

        let events = book.on_tick(&tick(1, 98.0)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(book.open_orders().count(), 0);
    }

    #[test]
    fn overflowing_tick_changes_nothing() {
        let mut book = book_at(100.0);
        for _ in 0..3 {
            book.place_order(OrderRequest::market(OrderSide::Buy, 1e306).take_profit(170.0)).unwrap();
        }

        let result = book.on_tick(&tick(1, 170.0));
        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(book.open_orders().count(), 3);
        assert!(book.history().is_empty());
        assert_eq!(book.balance(), 1000.0);
        assert_eq!(book.current_price(), Some(100.0));
        assert_eq!(book.last_tick_at(), Some(tick(0, 100.0).timestamp()));

        // the same instant is still usable afterwards
        assert!(book.on_tick(&tick(1, 150.0)).unwrap().is_empty());
        assert_eq!(book.current_price(), Some(150.0));
        assert_eq!(book.open_orders().count(), 3);
    }

    #[test]
    fn overflowing_close_all_changes_nothing() {
        let mut book = book_at(100.0);
        let orders = (0..3)
            .map(|_| book.place_order(OrderRequest::market(OrderSide::Buy, 1e306)).unwrap())
            .collect::<Vec<_>>();
        book.on_tick(&tick(1, 190.0)).unwrap();

        assert!(matches!(book.close_all(), Err(Error::InvalidAmount(_))));
        assert_eq!(book.open_orders().count(), 3);
        assert!(book.history().is_empty());
        assert_eq!(book.balance(), 1000.0);

        // one at a time still fits
        let pnl = book.close_order_at(orders[0].id(), 190.0).unwrap();
        assert_eq!(pnl, 90.0 * 1e306);
        assert!(matches!(book.close_order_at(orders[1].id(), 190.0), Err(Error::InvalidAmount(_))));
        assert_eq!(book.open_orders().count(), 2);
        assert_eq!(book.history().len(), 1);
    }

    #[test]
    fn reset_book() {
        let mut book = book_at(100.0);
        let order = book.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).unwrap();
        book.close_order_at(order.id(), 110.0).unwrap();

        book.reset();
        assert_eq!(book.balance(), 1000.0);
        assert!(book.history().is_empty());
        assert!(book.current_price().is_none());
        assert!(book.last_tick_at().is_none());
    }
}
