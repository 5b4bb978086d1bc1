use super::RecordingSink;
use anyhow::Result;
use pgw::{AllocationConfig, Config, Pgw};
use slog::{Drain, Logger, o};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub const INTERNET_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const SGW_ADDRESS: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

pub async fn init() -> Result<(Pgw, Arc<RecordingSink>, Logger)> {
    init_with(AllocationConfig::default()).await
}

pub async fn init_with(
    allocation: AllocationConfig,
) -> Result<(Pgw, Arc<RecordingSink>, Logger)> {
    let logger = init_logging();
    let sink = Arc::new(RecordingSink::new(logger.new(o!("sink" => 1))));
    let pgw = start_pgw(allocation, sink.clone(), &logger).await?;
    Ok((pgw, sink, logger))
}

fn init_logging() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build();
    let drain = std::sync::Mutex::new(drain).fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

async fn start_pgw(
    allocation: AllocationConfig,
    sink: Arc<RecordingSink>,
    logger: &Logger,
) -> Result<Pgw> {
    Pgw::start(
        Config {
            apns: HashMap::from([("internet".to_string(), INTERNET_GATEWAY)]),
            allocation,
            ..Config::default()
        },
        logger.new(o!("pgw" => 1)),
        sink,
    )
    .await
}

/// Allocation settings that leave only `hosts` subscriber addresses per APN.
pub fn small_subnet(hosts: u8) -> AllocationConfig {
    AllocationConfig {
        host_min: 2,
        host_max: 1 + hosts,
        ..AllocationConfig::default()
    }
}
