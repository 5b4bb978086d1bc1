use crate::Teid;
use crate::registry::{RouteMiss, SessionRegistry};
use anyhow::Result;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Transmission toward the two sides of the gateway.  Tunnel encapsulation, if any, is the
/// implementor's business.
#[async_trait]
pub trait PacketSink: Send + Sync + 'static {
    /// Send an uplink packet out on the external network, toward the APN gateway.
    async fn forward_to_apn(&self, gateway_address: Ipv4Addr, payload: Vec<u8>) -> Result<()>;

    /// Send a downlink packet to the SGW on the given data plane tunnel.
    async fn forward_to_peer_gateway(
        &self,
        peer_gateway_address: Ipv4Addr,
        peer_dp_teid: Teid,
        payload: Vec<u8>,
    ) -> Result<()>;
}

/// What happened to a packet that was not lost to a sink failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Forwarded,
    Dropped(RouteMiss),
}

/// Routes user plane packets using the state in the session registry.  It never modifies
/// the registry, and treats unknown identifiers as a reason to drop rather than an error -
/// packets can legitimately arrive after their bearer has gone.
#[derive(Clone)]
pub struct PacketDispatcher {
    registry: SessionRegistry,
    sink: Arc<dyn PacketSink>,
}

impl PacketDispatcher {
    pub fn new(registry: SessionRegistry, sink: Arc<dyn PacketSink>) -> Self {
        PacketDispatcher { registry, sink }
    }

    /// Forward a packet received from the SGW on `dp_teid` to its APN gateway.  Errors only
    /// if the sink fails.
    pub async fn handle_uplink(&self, dp_teid: Teid, packet: Vec<u8>) -> Result<Dispatch> {
        // The registry lock is released before the send.
        let route = match self.registry.uplink_route(dp_teid) {
            Ok(route) => route,
            Err(miss) => return Ok(Dispatch::Dropped(miss)),
        };
        self.sink
            .forward_to_apn(route.apn_gateway_address, packet)
            .await?;
        Ok(Dispatch::Forwarded)
    }

    /// Forward a packet from the external network to the SGW, on the default bearer of the
    /// subscriber it is addressed to.  Errors only if the sink fails.
    pub async fn handle_downlink(
        &self,
        subscriber_address: Ipv4Addr,
        packet: Vec<u8>,
    ) -> Result<Dispatch> {
        let route = match self.registry.downlink_route(subscriber_address) {
            Ok(route) => route,
            Err(miss) => return Ok(Dispatch::Dropped(miss)),
        };
        self.sink
            .forward_to_peer_gateway(route.peer_gateway_address, route.peer_dp_teid, packet)
            .await?;
        Ok(Dispatch::Forwarded)
    }
}
