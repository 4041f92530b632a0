use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use dts_rs::prelude::{
    OrderBook, OrderRequest, OrderSide, PercentCalculus, SessionEvent, SimConfig, Simulator, TickSource, position_size,
    session,
};

/// Demo trading simulator.
#[derive(Debug, Parser)]
#[command(name = "dts", version, about)]
struct Cli {
    /// TOML configuration file; `DTS_*` environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a timed session with one order and prints the outcome.
    Run(RunArgs),
    /// Computes a position size from the risked share of a balance.
    Size(SizeArgs),
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Number of ticks to evaluate before stopping.
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Seed of the synthetic feed.
    #[arg(long)]
    seed: Option<u64>,

    /// Pulls prices from the exchange instead of the synthetic feed.
    #[arg(long)]
    live: bool,

    #[arg(long, value_enum, default_value_t = Side::Buy)]
    side: Side,

    #[arg(long, default_value_t = 1.0)]
    quantity: f64,

    /// Stop-loss distance from the entry, in percent.
    #[arg(long)]
    stop_loss_pct: Option<f64>,

    /// Take-profit distance from the entry, in percent.
    #[arg(long)]
    take_profit_pct: Option<f64>,
}

#[derive(Debug, clap::Args)]
struct SizeArgs {
    #[arg(long)]
    balance: f64,

    /// Risked share of the balance, in percent.
    #[arg(long)]
    risk: f64,

    #[arg(long)]
    entry: f64,

    #[arg(long)]
    stop_loss: f64,

    #[arg(long, default_value_t = 1.0)]
    multiplier: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    Buy,
    Sell,
}

impl From<Side> for OrderSide {
    fn from(value: Side) -> Self {
        match value {
            Side::Buy => OrderSide::Buy,
            Side::Sell => OrderSide::Sell,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dts_rs=info,dts=info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let mut config = SimConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
            if args.seed.is_some() {
                config.feed.seed = args.seed;
            }

            let book = if args.live {
                run_live(&config, &args).await?
            } else {
                let sim = Simulator::synthetic(&config)?;
                drive(sim, &args, config.interval()).await?
            };
            report(&book);
        }
        Command::Size(args) => {
            let size = position_size(args.balance, args.risk, args.entry, args.stop_loss, args.multiplier)?;
            println!("{size:.6}");
        }
    }

    Ok(())
}

#[cfg(feature = "live")]
async fn run_live(config: &SimConfig, args: &RunArgs) -> Result<OrderBook> {
    use dts_rs::prelude::LiveFeed;

    let feed = LiveFeed::from_config(config)?;
    let book = OrderBook::new(config.initial_balance, config.contract_multiplier)?;
    drive(Simulator::new(feed, book), args, config.interval()).await
}

#[cfg(not(feature = "live"))]
async fn run_live(_config: &SimConfig, _args: &RunArgs) -> Result<OrderBook> {
    bail!("this build has no live feed, enable the `live` feature")
}

/// Places the order on the first tick, then lets the session run for `args.ticks` ticks.
async fn drive<S>(sim: Simulator<S>, args: &RunArgs, period: Duration) -> Result<OrderBook>
where
    S: TickSource + Send + 'static,
{
    let session = session::spawn(sim, period)?;
    let mut events = session.subscribe();

    let mut seen = 0;
    let mut placed = false;
    while seen < args.ticks {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event receiver lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            SessionEvent::Tick(tick) => {
                seen += 1;
                if !placed {
                    let request = order_request(args, tick.close());
                    let order = session.place_order(request).await?;
                    println!("Placed {} {} {} @ {:.4}", order.id(), order.side(), order.quantity(), order.entry_price());
                    placed = true;
                }
            }
            SessionEvent::Closed(event) => {
                println!(
                    "Closed {} by {} @ {:.4}: P&L {:.4}, balance {:.2}",
                    event.order.id(),
                    event.reason,
                    event.exit_price,
                    event.pnl,
                    event.balance
                );
            }
            SessionEvent::Paused | SessionEvent::Resumed => {}
        }
    }

    if !placed {
        bail!("session ended before the first tick");
    }

    let sim = session.shutdown().await?;
    let (_, book) = sim.into_parts();
    Ok(book)
}

fn order_request(args: &RunArgs, price: f64) -> OrderRequest {
    let side = OrderSide::from(args.side);
    let mut request = OrderRequest::market(side, args.quantity);

    // Exit levels sit on the losing / winning side of the entry for the chosen direction.
    if let Some(pct) = args.stop_loss_pct {
        request = request.stop_loss(match side {
            OrderSide::Buy => price.subpercent(pct),
            OrderSide::Sell => price.addpercent(pct),
        });
    }
    if let Some(pct) = args.take_profit_pct {
        request = request.take_profit(match side {
            OrderSide::Buy => price.addpercent(pct),
            OrderSide::Sell => price.subpercent(pct),
        });
    }
    request
}

fn report(book: &OrderBook) {
    println!();
    println!("Balance: {:.2}", book.balance());
    println!("Equity: {:.2}", book.total_balance());
    println!("Open orders: {}", book.open_orders().count());

    #[cfg(feature = "metrics")]
    {
        println!();
        println!("{}", dts_rs::metrics::Metrics::from(book));
    }
}
