use crate::registry::AllocationPolicy;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use slog::{Logger, error, info};
use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // APN name -> gateway address on the external network side.
    #[serde(default)]
    pub apns: HashMap<String, Ipv4Addr>,

    #[serde(default)]
    pub allocation: AllocationConfig,

    // Bound of each inbound packet queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    // How often packet counters are logged.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AllocationConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_teid_min")]
    pub teid_min: u32,
    #[serde(default = "default_teid_max")]
    pub teid_max: u32,
    #[serde(default = "default_host_min")]
    pub host_min: u8,
    #[serde(default = "default_host_max")]
    pub host_max: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            apns: HashMap::new(),
            allocation: AllocationConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        let policy = AllocationPolicy::default();
        AllocationConfig {
            max_attempts: policy.max_attempts,
            teid_min: *policy.teid_range.start(),
            teid_max: *policy.teid_range.end(),
            host_min: *policy.host_range.start(),
            host_max: *policy.host_range.end(),
        }
    }
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}
fn default_stats_interval_secs() -> u64 {
    DEFAULT_STATS_INTERVAL_SECS
}
fn default_max_attempts() -> u32 {
    AllocationConfig::default().max_attempts
}
fn default_teid_min() -> u32 {
    AllocationConfig::default().teid_min
}
fn default_teid_max() -> u32 {
    AllocationConfig::default().teid_max
}
fn default_host_min() -> u8 {
    AllocationConfig::default().host_min
}
fn default_host_max() -> u8 {
    AllocationConfig::default().host_max
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, gateway) in self.apns.iter() {
            let host = gateway.octets()[3];
            ensure!(
                host != 0 && host != 255,
                "Gateway {gateway} of APN {name} is a network or broadcast address"
            );
        }
        ensure!(self.channel_capacity > 0, "channel_capacity must be positive");
        ensure!(
            self.stats_interval_secs > 0,
            "stats_interval_secs must be positive"
        );
        self.allocation.validate()
    }

    pub fn allocation_policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            max_attempts: self.allocation.max_attempts,
            teid_range: self.allocation.teid_min..=self.allocation.teid_max,
            host_range: self.allocation.host_min..=self.allocation.host_max,
        }
    }
}

impl AllocationConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.max_attempts > 0, "max_attempts must be positive");
        ensure!(self.teid_min >= 1, "TEID 0 is reserved");
        ensure!(self.teid_min <= self.teid_max, "teid_min exceeds teid_max");
        ensure!(self.host_min >= 1, "Host number 0 is the network address");
        ensure!(self.host_max <= 254, "Host number 255 is the broadcast address");
        ensure!(self.host_min <= self.host_max, "host_min exceeds host_max");
        Ok(())
    }
}

/// Load the gateway configuration from a TOML file.
pub fn load_config_file(filename: &str, logger: &Logger) -> Result<Config> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load config file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let config = Config::from_toml(&contents).context(format!("Invalid config in {filename}"))?;
    for (name, gateway) in config.apns.iter() {
        info!(logger, "Loaded APN {name} with gateway {gateway} from {filename}");
    }
    Ok(config)
}
