use super::{Dispatch, PacketDispatcher};
use crate::Teid;
use async_channel::Receiver;
use async_std::task::{self, JoinHandle};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use derive_deref::Deref;
use slog::{Logger, debug, info};
use std::sync::Arc;

/// A packet received from the SGW, already stripped of its tunnel header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkPacket {
    pub dp_teid: Teid,
    pub payload: Vec<u8>,
}

pub mod uplink_counter_indices {
    pub const UL_RX_PKTS: usize = 0;
    pub const UL_RX_BYTES: usize = 1;
    pub const UL_TX_PKTS: usize = 2;
    // Drop counters must come last - see dump_stats().
    pub const UL_DROP_UNKNOWN_TEID: usize = 3;
    pub const UL_DROP_SINK_ERROR: usize = 4;
    pub const UL_NUM_COUNTERS: usize = 5;
}
use uplink_counter_indices::*;

#[derive(Deref, Default)]
pub struct UplinkCounters([RelaxedCounter; UL_NUM_COUNTERS]);

pub struct UplinkPipeline {
    receiver: Receiver<UplinkPacket>,
    dispatcher: PacketDispatcher,
    counters: Arc<UplinkCounters>,
}

impl UplinkPipeline {
    pub fn new(
        receiver: Receiver<UplinkPacket>,
        dispatcher: PacketDispatcher,
        counters: Arc<UplinkCounters>,
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
                self.handle_uplink_packet(packet, &logger).await;
            }
            info!(logger, "Exiting uplink pipeline");
        })
    }

    async fn handle_uplink_packet(&self, packet: UplinkPacket, logger: &Logger) {
        self.counters[UL_RX_PKTS].inc();
        self.counters[UL_RX_BYTES].add(packet.payload.len());
        let dp_teid = packet.dp_teid;
        match self.dispatcher.handle_uplink(dp_teid, packet.payload).await {
            Ok(Dispatch::Forwarded) => {
                self.counters[UL_TX_PKTS].inc();
            }
            Ok(Dispatch::Dropped(_)) => {
                self.counters[UL_DROP_UNKNOWN_TEID].inc();
            }
            Err(e) => {
                self.counters[UL_DROP_SINK_ERROR].inc();
                debug!(logger, "Failed to forward uplink packet on {dp_teid} - {e}");
            }
        }
    }
}
