//! main - starts a single-instance PGW with a logging packet sink

use anyhow::Result;
use async_std::channel::Sender;
use async_std::prelude::*;
use async_trait::async_trait;
use clap::Parser;
use pgw::{PacketSink, Pgw, Teid};
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, debug, info, o, warn};
use std::net::Ipv4Addr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with the APN table and allocation settings.
    #[arg(long, default_value = "pgw.toml")]
    config: String,

    /// Set up the demo PDN connection on APN 'internet' (SGW 10.0.0.1, SGW TEID 12345)
    /// with one bearer (SGW TEID 54321) at startup.
    #[arg(long)]
    demo: bool,

    /// Override the interval in seconds at which packet counters are logged.
    #[arg(long)]
    stats_interval_secs: Option<u64>,
}

/// Stands in for the GTP-U transmission layer - logs each forwarding decision.
struct LoggingSink {
    logger: Logger,
}

#[async_trait]
impl PacketSink for LoggingSink {
    async fn forward_to_apn(&self, gateway_address: Ipv4Addr, payload: Vec<u8>) -> Result<()> {
        debug!(
            self.logger,
            "Forward {} bytes to APN gateway {gateway_address}",
            payload.len()
        );
        Ok(())
    }

    async fn forward_to_peer_gateway(
        &self,
        peer_gateway_address: Ipv4Addr,
        peer_dp_teid: Teid,
        payload: Vec<u8>,
    ) -> Result<()> {
        debug!(
            self.logger,
            "Forward {} bytes to SGW {peer_gateway_address} on {peer_dp_teid}",
            payload.len()
        );
        Ok(())
    }
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    let mut config = pgw::load_config_file(&args.config, &logger)?;
    if let Some(secs) = args.stats_interval_secs {
        config.stats_interval_secs = secs;
    }

    let sink = Arc::new(LoggingSink {
        logger: logger.new(o!("sink" => 1)),
    });
    let pgw = Pgw::start(config, logger.clone(), sink).await?;

    if args.demo {
        run_demo(&pgw, &logger)?;
    }

    wait_for_signal(&logger).await?;
    pgw.graceful_shutdown().await;

    Ok(())
}

fn run_demo(pgw: &Pgw, logger: &Logger) -> Result<()> {
    if pgw.registry().apn_gateway("internet").is_none() {
        pgw.register_apn("internet", Ipv4Addr::new(192, 168, 1, 1));
    }
    let session = pgw.create_session("internet", Ipv4Addr::new(10, 0, 0, 1), Teid(12345))?;
    let bearer = pgw.create_bearer(&session, Teid(54321))?;
    info!(logger, "UE IP: {}", session.subscriber_address);
    info!(logger, "Bearer TEID: {}", bearer.dp_teid);
    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

async fn wait_for_signal(logger: &Logger) -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task =
        async_std::task::spawn(handle_signals(signals, sig_sender, logger.clone()));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>, logger: Logger) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                info!(logger, "Ignoring SIGHUP - configuration is only read at startup");
            }
            SIGTERM | SIGINT | SIGQUIT => {
                if !request_shutdown(&sig_sender, signal, &logger).await {
                    break;
                }
            }
            _ => unreachable!(),
        }
    }
}

/// Pass a shutdown signal to main.  Returns false if main is no longer listening.
async fn request_shutdown(sig_sender: &Sender<i32>, signal: i32, logger: &Logger) -> bool {
    match sig_sender.send(signal).await {
        Ok(()) => true,
        Err(e) => {
            warn!(logger, "Dropped signal {} - shutdown already under way", e.0);
            false
        }
    }
}
