use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Unique identifier of an order within a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents the side of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// `1.0` for buys, `-1.0` for sells.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("buy"),
            Self::Sell => f.write_str("sell"),
        }
    }
}

/// Represents how an order enters the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Fills immediately at the current price.
    Market,
    /// Waits for a better price.
    Limit,
    /// Waits for a breakout price.
    Stop,
}

impl OrderKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
        }
    }
}

/// Lifecycle state of an order held by the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Pending,
}

/// A request to place an order, validated before it reaches the book.
///
/// ### Example
/// ```rust
/// use dts_rs::prelude::*;
///
/// let request = OrderRequest::market(OrderSide::Buy, 1.0)
///     .stop_loss(99.0)
///     .take_profit(101.0);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: f64,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl OrderRequest {
    /// A market order, filled at the current price.
    pub fn market(side: OrderSide, quantity: f64) -> Self {
        Self {
            side,
            kind: OrderKind::Market,
            quantity,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// A limit order waiting at `price`.
    pub fn limit(side: OrderSide, quantity: f64, price: f64) -> Self {
        Self {
            kind: OrderKind::Limit,
            entry_price: Some(price),
            ..Self::market(side, quantity)
        }
    }

    /// A stop order waiting at `price`.
    pub fn stop(side: OrderSide, quantity: f64, price: f64) -> Self {
        Self {
            kind: OrderKind::Stop,
            entry_price: Some(price),
            ..Self::market(side, quantity)
        }
    }

    /// Attaches a stop-loss price.
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Attaches a take-profit price.
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// Checks quantity and prices without touching any book.
    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(Error::InvalidQuantity(self.quantity));
        }
        for price in [self.entry_price, self.stop_loss, self.take_profit].into_iter().flatten() {
            check_price(price)?;
        }
        if self.kind != OrderKind::Market && self.entry_price.is_none() {
            return Err(Error::MissingEntryPrice(self.kind.name()));
        }
        Ok(())
    }
}

pub(crate) fn check_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidPrice(price));
    }
    Ok(price)
}

/// An order held by the book, either open (a live position) or pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    side: OrderSide,
    kind: OrderKind,
    entry_price: f64,
    quantity: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    status: OrderStatus,
    opened_at: DateTime<Utc>,
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Order {
    /// Creates the order from a validated request. Market orders open at `market_price`.
    pub(crate) fn new(id: OrderId, request: &OrderRequest, market_price: f64, opened_at: DateTime<Utc>) -> Self {
        let (entry_price, status) = match request.kind {
            OrderKind::Market => (market_price, OrderStatus::Open),
            _ => (request.entry_price.unwrap_or(market_price), OrderStatus::Pending),
        };

        Self {
            id,
            side: request.side,
            kind: request.kind,
            entry_price,
            quantity: request.quantity,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            status,
            opened_at,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.stop_loss
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.take_profit
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Time the order was placed.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Profit or loss if the order were closed at `exit_price`.
    ///
    /// `(exit - entry) * quantity * multiplier` for buys, the opposite for sells.
    pub fn pnl_at(&self, exit_price: f64, multiplier: f64) -> f64 {
        (exit_price - self.entry_price) * self.quantity * multiplier * self.side.sign()
    }

    /// Returns the exit trigger crossed by `price`, if any.
    ///
    /// Buys stop out at or below the stop-loss and take profit at or above the take-profit;
    /// sells mirror this. When both are crossed the stop-loss wins.
    pub fn triggered_exit(&self, price: f64) -> Option<(CloseReason, f64)> {
        let stop_hit = self.stop_loss.filter(|sl| match self.side {
            OrderSide::Buy => price <= *sl,
            OrderSide::Sell => price >= *sl,
        });
        if let Some(sl) = stop_hit {
            return Some((CloseReason::StopLoss, sl));
        }

        self.take_profit
            .filter(|tp| match self.side {
                OrderSide::Buy => price >= *tp,
                OrderSide::Sell => price <= *tp,
            })
            .map(|tp| (CloseReason::TakeProfit, tp))
    }
}

/// Why an order left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Manual,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StopLoss => f.write_str("stop-loss"),
            Self::TakeProfit => f.write_str("take-profit"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Emitted when an open order is closed and its P&L realized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseEvent {
    pub order: Order,
    pub exit_price: f64,
    pub pnl: f64,
    pub reason: CloseReason,
    pub timestamp: DateTime<Utc>,
    /// Balance right after the P&L was applied.
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(side: OrderSide, sl: Option<f64>, tp: Option<f64>) -> Order {
        let request = OrderRequest {
            stop_loss: sl,
            take_profit: tp,
            ..OrderRequest::market(side, 1.0)
        };
        Order::new(OrderId(1), &request, 100.0, DateTime::default())
    }

    #[test]
    fn market_order_opens_at_market_price() {
        let request = OrderRequest::market(OrderSide::Buy, 2.0).stop_loss(1.0);
        let order = Order::new(OrderId(7), &request, 123.0, DateTime::default());

        assert_eq!(order.id(), OrderId(7));
        assert_eq!(order.entry_price(), 123.0);
        assert_eq!(order.quantity(), 2.0);
        assert_eq!(order.status(), OrderStatus::Open);
        assert!(order.is_open());
    }

    #[test]
    fn limit_and_stop_orders_start_pending() {
        let limit = Order::new(OrderId(1), &OrderRequest::limit(OrderSide::Buy, 1.0, 95.0), 100.0, DateTime::default());
        assert_eq!(limit.status(), OrderStatus::Pending);
        assert_eq!(limit.entry_price(), 95.0);

        let stop = Order::new(OrderId(2), &OrderRequest::stop(OrderSide::Sell, 1.0, 90.0), 100.0, DateTime::default());
        assert_eq!(stop.status(), OrderStatus::Pending);
        assert_eq!(stop.kind(), OrderKind::Stop);
    }

    #[test]
    fn validate_quantity() {
        assert!(matches!(
            OrderRequest::market(OrderSide::Buy, 0.0).validate(),
            Err(Error::InvalidQuantity(_))
        ));
        assert!(matches!(
            OrderRequest::market(OrderSide::Buy, -1.0).validate(),
            Err(Error::InvalidQuantity(_))
        ));
        assert!(matches!(
            OrderRequest::market(OrderSide::Buy, f64::NAN).validate(),
            Err(Error::InvalidQuantity(_))
        ));
    }

    #[test]
    fn validate_prices() {
        let request = OrderRequest::market(OrderSide::Buy, 1.0).stop_loss(-5.0);
        assert!(matches!(request.validate(), Err(Error::InvalidPrice(_))));

        let request = OrderRequest::limit(OrderSide::Buy, 1.0, f64::INFINITY);
        assert!(matches!(request.validate(), Err(Error::InvalidPrice(_))));

        let request = OrderRequest {
            entry_price: None,
            ..OrderRequest::limit(OrderSide::Buy, 1.0, 10.0)
        };
        assert!(matches!(request.validate(), Err(Error::MissingEntryPrice("limit"))));
    }

    #[test]
    fn pnl_buy_and_sell() {
        let buy = order(OrderSide::Buy, None, None);
        assert_eq!(buy.pnl_at(105.0, 1.0), 5.0);
        assert_eq!(buy.pnl_at(95.0, 10.0), -50.0);

        let sell = order(OrderSide::Sell, None, None);
        assert_eq!(sell.pnl_at(95.0, 1.0), 5.0);
        assert_eq!(sell.pnl_at(105.0, 10.0), -50.0);
    }

    #[test]
    fn buy_triggers() {
        let buy = order(OrderSide::Buy, Some(99.0), Some(101.0));
        assert_eq!(buy.triggered_exit(99.0), Some((CloseReason::StopLoss, 99.0)));
        assert_eq!(buy.triggered_exit(98.0), Some((CloseReason::StopLoss, 99.0)));
        assert_eq!(buy.triggered_exit(101.0), Some((CloseReason::TakeProfit, 101.0)));
        assert_eq!(buy.triggered_exit(100.5), None);
    }

    #[test]
    fn sell_triggers() {
        let sell = order(OrderSide::Sell, Some(101.0), Some(99.0));
        assert_eq!(sell.triggered_exit(101.5), Some((CloseReason::StopLoss, 101.0)));
        assert_eq!(sell.triggered_exit(99.0), Some((CloseReason::TakeProfit, 99.0)));
        assert_eq!(sell.triggered_exit(100.0), None);
    }

    #[test]
    fn stop_loss_wins_when_both_cross() {
        // inverted brackets: a close of 100 crosses both
        let buy = order(OrderSide::Buy, Some(101.0), Some(99.0));
        assert_eq!(buy.triggered_exit(100.0), Some((CloseReason::StopLoss, 101.0)));

        let sell = order(OrderSide::Sell, Some(99.0), Some(101.0));
        assert_eq!(sell.triggered_exit(100.0), Some((CloseReason::StopLoss, 99.0)));
    }

    #[test]
    fn order_equality_by_id() {
        let a = order(OrderSide::Buy, None, None);
        let mut b = order(OrderSide::Sell, Some(1.0), None);
        assert_eq!(a, b);
        b.id = OrderId(2);
        assert_ne!(a, b);
    }
}
