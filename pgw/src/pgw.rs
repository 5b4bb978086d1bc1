use crate::registry::{DefaultBearerPolicy, RegistryError, SessionRegistry};
use crate::userplane::{
    DownlinkCounters, DownlinkPacket, DownlinkPipeline, PacketDispatcher, PacketSink,
    UplinkCounters, UplinkPacket, UplinkPipeline, dump_stats,
};
use crate::{Bearer, Config, PdnConnection, Teid};
use anyhow::Result;
use async_channel::Sender;
use async_std::sync::Mutex;
use async_std::task::JoinHandle;
use slog::{Logger, info, o, warn};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use stop_token::StopSource;

struct Tasks {
    uplink: JoinHandle<()>,
    downlink: JoinHandle<()>,
    stats: JoinHandle<()>,
    stop_stats: StopSource,
}

/// A running gateway: the session registry plus the uplink and downlink pipelines that
/// route packets according to it.
#[derive(Clone)]
pub struct Pgw {
    config: Config,
    logger: Logger,
    registry: SessionRegistry,
    uplink_sender: Sender<UplinkPacket>,
    downlink_sender: Sender<DownlinkPacket>,
    tasks: Arc<Mutex<Option<Tasks>>>,
}

impl Pgw {
    pub async fn start(config: Config, logger: Logger, sink: Arc<dyn PacketSink>) -> Result<Self> {
        config.validate()?;
        let registry = SessionRegistry::new(config.allocation_policy());
        for (name, gateway) in config.apns.iter() {
            registry.register_apn(name, *gateway);
            info!(&logger, "Registered APN {name} with gateway {gateway}");
        }
        let dispatcher = PacketDispatcher::new(registry.clone(), sink);

        // Start the uplink pipeline (SGW -> APN).
        let (uplink_sender, uplink_receiver) = async_channel::bounded(config.channel_capacity);
        let uplink_counters = Arc::new(UplinkCounters::default());
        let uplink =
            UplinkPipeline::new(uplink_receiver, dispatcher.clone(), uplink_counters.clone())
                .run(logger.new(o!("pipeline" => "uplink")));

        // Start the downlink pipeline (APN -> SGW).
        let (downlink_sender, downlink_receiver) =
            async_channel::bounded(config.channel_capacity);
        let downlink_counters = Arc::new(DownlinkCounters::default());
        let downlink =
            DownlinkPipeline::new(downlink_receiver, dispatcher, downlink_counters.clone())
                .run(logger.new(o!("pipeline" => "downlink")));

        // Spawn the stats task
        let stop_stats = StopSource::new();
        let stats = async_std::task::spawn(dump_stats(
            logger.clone(),
            downlink_counters,
            uplink_counters,
            Duration::from_secs(config.stats_interval_secs),
            stop_stats.token(),
        ));

        Ok(Pgw {
            config,
            logger,
            registry,
            uplink_sender,
            downlink_sender,
            tasks: Arc::new(Mutex::new(Some(Tasks {
                uplink,
                downlink,
                stats,
                stop_stats,
            }))),
        })
    }

    /// Stop accepting packets, let the pipelines drain what is already queued, then stop.
    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        self.uplink_sender.close();
        self.downlink_sender.close();
        if let Some(tasks) = self.tasks.lock().await.take() {
            tasks.uplink.await;
            tasks.downlink.await;
            drop(tasks.stop_stats);
            tasks.stats.await;
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub async fn submit_uplink_packet(&self, dp_teid: Teid, payload: Vec<u8>) -> Result<()> {
        self.uplink_sender
            .send(UplinkPacket { dp_teid, payload })
            .await?;
        Ok(())
    }

    pub async fn submit_downlink_packet(
        &self,
        subscriber_address: Ipv4Addr,
        payload: Vec<u8>,
    ) -> Result<()> {
        self.downlink_sender
            .send(DownlinkPacket {
                subscriber_address,
                payload,
            })
            .await?;
        Ok(())
    }

    pub fn register_apn(&self, name: &str, gateway_address: Ipv4Addr) {
        if let Some(old) = self.registry.register_apn(name, gateway_address) {
            info!(
                &self.logger,
                "Changed gateway of APN {name} from {old} to {gateway_address}"
            );
        } else {
            info!(&self.logger, "Registered APN {name} with gateway {gateway_address}");
        }
    }

    pub fn create_session(
        &self,
        apn: &str,
        peer_gateway_address: Ipv4Addr,
        peer_cp_teid: Teid,
    ) -> Result<PdnConnection, RegistryError> {
        self.registry
            .create_session(apn, peer_gateway_address, peer_cp_teid)
            .inspect(|session| {
                info!(
                    &self.logger,
                    "Created PDN connection {}, peer {}-{}",
                    session,
                    peer_gateway_address,
                    peer_cp_teid
                )
            })
            .inspect_err(|e| warn!(&self.logger, "Failed to create PDN connection - {e}"))
    }

    pub fn delete_session(&self, cp_teid: Teid) {
        match self.registry.delete_session(cp_teid) {
            Some(session) => info!(
                &self.logger,
                "Deleted PDN connection {} and {} bearer(s)",
                session,
                session.bearers.len()
            ),
            None => info!(&self.logger, "Ignore delete of unknown PDN connection {cp_teid}"),
        }
    }

    pub fn create_bearer(
        &self,
        session: &PdnConnection,
        peer_dp_teid: Teid,
    ) -> Result<Bearer, RegistryError> {
        self.create_bearer_with_policy(session, peer_dp_teid, DefaultBearerPolicy::FirstBearer)
    }

    pub fn create_bearer_with_policy(
        &self,
        session: &PdnConnection,
        peer_dp_teid: Teid,
        default_policy: DefaultBearerPolicy,
    ) -> Result<Bearer, RegistryError> {
        let logger = self.logger.new(o!("cp_teid" => session.cp_teid.to_string()));
        self.registry
            .create_bearer_with_policy(session, peer_dp_teid, default_policy)
            .inspect(|bearer| info!(&logger, "Created bearer {}", bearer))
            .inspect_err(|e| warn!(&logger, "Failed to create bearer - {e}"))
    }

    pub fn delete_bearer(&self, dp_teid: Teid) {
        match self.registry.delete_bearer(dp_teid) {
            Some(bearer) => info!(
                &self.logger,
                "Deleted bearer {}", bearer;
                "cp_teid" => bearer.cp_teid.to_string()
            ),
            None => info!(&self.logger, "Ignore delete of unknown bearer {dp_teid}"),
        }
    }

    pub fn find_session_by_cp_teid(&self, cp_teid: Teid) -> Option<PdnConnection> {
        self.registry.find_session_by_cp_teid(cp_teid)
    }

    pub fn find_session_by_subscriber_address(
        &self,
        subscriber_address: Ipv4Addr,
    ) -> Option<PdnConnection> {
        self.registry
            .find_session_by_subscriber_address(subscriber_address)
    }

    pub fn find_bearer_by_dp_teid(&self, dp_teid: Teid) -> Option<Bearer> {
        self.registry.find_bearer_by_dp_teid(dp_teid)
    }
}
