use super::{Dispatch, PacketDispatcher};
use crate::registry::RouteMiss;
use async_channel::Receiver;
use async_std::task::{self, JoinHandle};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use derive_deref::Deref;
use slog::{Logger, debug, info};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// A packet from the external network, addressed to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkPacket {
    pub subscriber_address: Ipv4Addr,
    pub payload: Vec<u8>,
}

pub mod downlink_counter_indices {
    pub const DL_RX_PKTS: usize = 0;
    pub const DL_RX_BYTES: usize = 1;
    pub const DL_TX_PKTS: usize = 2;
    // Drop counters must come last - see dump_stats().
    pub const DL_DROP_UNKNOWN_IP: usize = 3;
    pub const DL_DROP_NO_DEFAULT_BEARER: usize = 4;
    pub const DL_DROP_SINK_ERROR: usize = 5;
    pub const DL_NUM_COUNTERS: usize = 6;
}
use downlink_counter_indices::*;

#[derive(Deref, Default)]
pub struct DownlinkCounters([RelaxedCounter; DL_NUM_COUNTERS]);

pub struct DownlinkPipeline {
    receiver: Receiver<DownlinkPacket>,
    dispatcher: PacketDispatcher,
    counters: Arc<DownlinkCounters>,
}

impl DownlinkPipeline {
    pub fn new(
        receiver: Receiver<DownlinkPacket>,
        dispatcher: PacketDispatcher,
        counters: Arc<DownlinkCounters>,
    ) -> Self {
        Self {
            receiver,
            dispatcher,
            counters,
        }
    }

    /// Runs until the inbound channel is closed and drained.
    pub fn run(self, logger: Logger) -> JoinHandle<()> {
        task::spawn(async move {
            while let Ok(packet) = self.receiver.recv().await {
                self.handle_downlink_packet(packet, &logger).await;
            }
            info!(logger, "Exiting downlink pipeline");
        })
    }

    async fn handle_downlink_packet(&self, packet: DownlinkPacket, logger: &Logger) {
        self.counters[DL_RX_PKTS].inc();
        self.counters[DL_RX_BYTES].add(packet.payload.len());
        let ue_ip = packet.subscriber_address;
        match self.dispatcher.handle_downlink(ue_ip, packet.payload).await {
            Ok(Dispatch::Forwarded) => {
                self.counters[DL_TX_PKTS].inc();
            }
            Ok(Dispatch::Dropped(RouteMiss::NoDefaultBearer)) => {
                self.counters[DL_DROP_NO_DEFAULT_BEARER].inc();
            }
            Ok(Dispatch::Dropped(_)) => {
                self.counters[DL_DROP_UNKNOWN_IP].inc();
            }
            Err(e) => {
                self.counters[DL_DROP_SINK_ERROR].inc();
                debug!(logger, "Failed to forward downlink packet for {ue_ip} - {e}");
            }
        }
    }
}
