use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use alpha_feed::bootstrap::{build_market_feed, build_signal_client};
use alpha_feed::config::Config;
use alpha_feed::event::FeedEvent;
use alpha_feed::input::{parse_command, FeedCommand, HELP_TEXT};
use alpha_feed::market_metrics::{
    average_range_pct, classify_volatility, data_source_label, price_change, trend,
};
use alpha_feed::model::{Asset, Candle};
use alpha_feed::net::ReqwestTransport;
use alpha_feed::runtime::{FeedPoller, MarketSession, RefreshGate};
use alpha_feed::signal::SignalService;

fn print_status(session: &MarketSession) {
    let series = session.series();
    let Some(change) = price_change(series) else {
        println!("{}: waiting for data", session.asset());
        return;
    };
    let (direction, strength) = trend(series);
    let range = average_range_pct(series);
    println!(
        "{} {:.2} {}{:.2} ({:.2}%) | {} | trend {:?} {}% | volatility {:?} {:.2}% | {} bars",
        session.asset(),
        change.current,
        if change.change >= 0.0 { "▲" } else { "▼" },
        change.change.abs(),
        change.percent.abs(),
        data_source_label(session.asset(), session.is_live()),
        direction,
        strength,
        classify_volatility(range),
        range.unwrap_or(0.0),
        series.len(),
    );
}

fn spawn_stdin_reader(cmd_tx: mpsc::Sender<FeedCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(cmd) => {
                        if cmd_tx.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("unknown command '{}'. {}", line.trim(), HELP_TEXT),
                },
                Ok(None) => {
                    let _ = cmd_tx.send(FeedCommand::Quit).await;
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
}

fn spawn_analysis(
    signals: Arc<dyn SignalService>,
    asset: Asset,
    candles: Vec<Candle>,
    app_tx: mpsc::Sender<FeedEvent>,
) {
    tokio::spawn(async move {
        let signal = signals.generate(asset, &candles).await;
        let _ = app_tx.send(FeedEvent::SignalReady { asset, signal }).await;
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ needs a process-wide crypto provider; ignore if one is set.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists and is valid");
            std::process::exit(1);
        }
    };

    // Log to file so stdout stays readable.
    let log_file = std::fs::File::create(&config.logging.file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        asset = %config.feed.default_asset,
        poll_interval = %config.feed.poll_interval,
        signal_key = config.signal.api_key.is_some(),
        "Starting alpha-feed"
    );

    let transport = Arc::new(ReqwestTransport::new()?);
    let feed = Arc::new(build_market_feed(&config, transport)?);
    let signals: Arc<dyn SignalService> = Arc::new(build_signal_client(&config)?);
    let poll_interval = config.feed.poll_interval()?;

    let (app_tx, mut app_rx) = mpsc::channel::<FeedEvent>(64);
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<FeedCommand>(16);
    let (asset_tx, asset_rx) = watch::channel(config.feed.default_asset);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = FeedPoller::new(feed.clone(), RefreshGate::default(), poll_interval);
    let poller_handle = tokio::spawn(poller.run(asset_rx, shutdown_rx, app_tx.clone()));
    spawn_stdin_reader(cmd_tx);

    println!("alpha-feed watching {}. {}", config.feed.default_asset, HELP_TEXT);
    let mut session = MarketSession::new(config.feed.default_asset);
    let mut analyzing = false;

    loop {
        tokio::select! {
            Some(event) = app_rx.recv() => match event {
                FeedEvent::SeriesUpdated { asset, candles, is_live } => {
                    if session.apply(asset, candles, is_live) {
                        print_status(&session);
                    }
                }
                FeedEvent::AssetSwitched(asset) => {
                    session.switch_to(asset);
                    println!("switched to {}", asset);
                }
                FeedEvent::StaleDiscarded(asset) => {
                    tracing::debug!(asset = %asset, "stale series dropped");
                }
                FeedEvent::SignalReady { asset, signal } => {
                    analyzing = false;
                    if asset != session.asset() {
                        tracing::info!(asset = %asset, "signal for inactive asset dropped");
                        continue;
                    }
                    println!(
                        "{} signal {} conf {:.0}% entry {:.2} sl {:.2} tp {:.2} rr {} | {}",
                        asset,
                        signal.signal_type,
                        signal.confidence,
                        signal.entry_price,
                        signal.stop_loss,
                        signal.take_profit,
                        signal.risk_reward_ratio,
                        signal.reasoning,
                    );
                }
                FeedEvent::LogMessage(msg) => println!("{}", msg),
            },
            Some(cmd) = cmd_rx.recv() => match cmd {
                FeedCommand::SwitchAsset(asset) => {
                    if asset != *asset_tx.borrow() {
                        let _ = asset_tx.send(asset);
                    }
                }
                FeedCommand::Analyze => {
                    if analyzing || session.series().is_empty() {
                        let _ = app_tx
                            .send(FeedEvent::LogMessage("analysis busy or no data yet".to_string()))
                            .await;
                        continue;
                    }
                    analyzing = true;
                    spawn_analysis(
                        signals.clone(),
                        session.asset(),
                        session.series().to_vec(),
                        app_tx.clone(),
                    );
                }
                FeedCommand::Status => print_status(&session),
                FeedCommand::Help => println!("{}", HELP_TEXT),
                FeedCommand::Quit => {
                    tracing::info!("User quit");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = poller_handle.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
