//! Timer-driven demo session.
//!
//! A session is a single tokio task owning a [`Simulator`]. A periodic timer is the only
//! driver of ticks; orders, pause/resume and snapshots reach the task as commands, so the
//! book never has a second writer. Ticks and close events are published to subscribers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::engine::{CloseEvent, Order, OrderId, OrderRequest, PriceTick};
use crate::errors::{Error, Result};
use crate::feed::TickSource;
use crate::sim::Simulator;

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 256;

/// What a session publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A tick was evaluated.
    Tick(PriceTick),
    /// An order was closed, by its exit rule or by hand.
    Closed(CloseEvent),
    Paused,
    Resumed,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub balance: f64,
    pub equity: f64,
    pub unrealized_pnl: f64,
    pub current_price: Option<f64>,
    pub ticks: u64,
    pub paused: bool,
    pub open: Vec<Order>,
    pub pending: Vec<Order>,
}

impl<S: TickSource> From<(&Simulator<S>, bool)> for Snapshot {
    fn from((sim, paused): (&Simulator<S>, bool)) -> Self {
        let book = sim.book();
        Self {
            balance: book.balance(),
            equity: book.total_balance(),
            unrealized_pnl: book.unrealized_pnl(),
            current_price: book.current_price(),
            ticks: sim.ticks(),
            paused,
            open: book.open_orders().copied().collect(),
            pending: book.pending_orders().copied().collect(),
        }
    }
}

enum Command {
    Place(OrderRequest, oneshot::Sender<Result<Order>>),
    Close(OrderId, oneshot::Sender<Result<f64>>),
    Cancel(OrderId, oneshot::Sender<Result<Order>>),
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<Snapshot>),
}

/// Cancellable handle on a running session.
///
/// Dropping the handle tears the session down; [`shutdown`](SessionHandle::shutdown) does the
/// same and hands the simulator back.
pub struct SessionHandle<S> {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    task: JoinHandle<Simulator<S>>,
}

/// Starts a session ticking every `period`. The first tick fires immediately.
///
/// ### Example
/// ```rust
/// use std::time::Duration;
///
/// use dts_rs::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> dts_rs::errors::Result<()> {
/// let mut config = SimConfig::default();
/// config.feed.seed = Some(1);
/// let sim = Simulator::synthetic(&config)?;
///
/// let session = session::spawn(sim, Duration::from_millis(10))?;
/// let mut events = session.subscribe();
/// while let Ok(event) = events.recv().await {
///     if let SessionEvent::Tick(_) = event {
///         break;
///     }
/// }
/// let order = session.place_order(OrderRequest::market(OrderSide::Buy, 1.0)).await?;
/// assert!(order.is_open());
///
/// let sim = session.shutdown().await?;
/// assert_eq!(sim.book().open_orders().count(), 1);
/// # Ok(())
/// # }
/// ```
pub fn spawn<S>(sim: Simulator<S>, period: Duration) -> Result<SessionHandle<S>>
where
    S: TickSource + Send + 'static,
{
    if period.is_zero() {
        return Err(Error::InvalidInterval);
    }

    let (commands, receiver) = mpsc::channel(COMMAND_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    let task = tokio::spawn(run(sim, period, receiver, events.clone()));

    tracing::info!(period_ms = period.as_millis() as u64, "Session started");
    Ok(SessionHandle { commands, events, task })
}

impl<S> SessionHandle<S> {
    /// Subscribes to ticks and close events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Places an order in the session's book.
    pub async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        self.request(|tx| Command::Place(request, tx)).await?
    }

    /// Closes an open order at the current price and returns the realized P&L.
    pub async fn close_order(&self, id: OrderId) -> Result<f64> {
        self.request(|tx| Command::Close(id, tx)).await?
    }

    /// Cancels a pending order.
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        self.request(|tx| Command::Cancel(id, tx)).await?
    }

    /// Stops ticking. The book is kept as is.
    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    /// Starts ticking again, one full period from now.
    pub async fn resume(&self) -> Result<()> {
        self.request(Command::Resume).await
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stops the session and returns its simulator.
    pub async fn shutdown(self) -> Result<Simulator<S>> {
        let Self { commands, task, .. } = self;
        drop(commands);
        task.await.map_err(|_| Error::SessionClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(command(tx)).await.map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)
    }
}

async fn run<S: TickSource>(
    mut sim: Simulator<S>,
    period: Duration,
    mut commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<SessionEvent>,
) -> Simulator<S> {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut paused = false;

    loop {
        tokio::select! {
            _ = ticker.tick(), if !paused => match sim.step().await {
                Ok(step) => {
                    if let Some(tick) = step.tick {
                        publish(&events, SessionEvent::Tick(tick));
                    }
                    for event in step.closed {
                        publish(&events, SessionEvent::Closed(event));
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Tick skipped"),
            },
            command = commands.recv() => match command {
                Some(command) => handle(&mut sim, command, &mut paused, &mut ticker, &events),
                None => break,
            },
        }
    }

    tracing::info!(ticks = sim.ticks(), balance = sim.book().balance(), "Session stopped");
    sim
}

fn handle<S: TickSource>(
    sim: &mut Simulator<S>,
    command: Command,
    paused: &mut bool,
    ticker: &mut Interval,
    events: &broadcast::Sender<SessionEvent>,
) {
    // a dropped reply receiver only means the caller gave up waiting
    match command {
        Command::Place(request, reply) => {
            let result = sim.book_mut().place_order(request);
            if let Err(e) = &result {
                tracing::info!(error = %e, "Order rejected");
            }
            reply.send(result).ok();
        }
        Command::Close(id, reply) => {
            let result = sim.book_mut().close_order(id);
            if result.is_ok() {
                if let Some(event) = sim.book().history().last() {
                    publish(events, SessionEvent::Closed(*event));
                }
            }
            reply.send(result).ok();
        }
        Command::Cancel(id, reply) => {
            reply.send(sim.book_mut().cancel_order(id)).ok();
        }
        Command::Pause(reply) => {
            if !*paused {
                *paused = true;
                tracing::info!(ticks = sim.ticks(), "Session paused");
                publish(events, SessionEvent::Paused);
            }
            reply.send(()).ok();
        }
        Command::Resume(reply) => {
            if *paused {
                *paused = false;
                ticker.reset();
                tracing::info!(ticks = sim.ticks(), "Session resumed");
                publish(events, SessionEvent::Resumed);
            }
            reply.send(()).ok();
        }
        Command::Snapshot(reply) => {
            reply.send(Snapshot::from((&*sim, *paused))).ok();
        }
    }
}

fn publish(events: &broadcast::Sender<SessionEvent>, event: SessionEvent) {
    // no subscriber is fine
    events.send(event).ok();
}
