//! mock_sink - enables a test script to observe what the PGW sends to the APN and SGW sides

use anyhow::{Result, bail};
use async_channel::{Receiver, Sender};
use async_std::future;
use async_trait::async_trait;
use pgw::{PacketSink, Teid};
use slog::{Logger, info};
use std::net::Ipv4Addr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forward {
    ToApn {
        gateway_address: Ipv4Addr,
        payload: Vec<u8>,
    },
    ToPeerGateway {
        peer_gateway_address: Ipv4Addr,
        peer_dp_teid: Teid,
        payload: Vec<u8>,
    },
}

pub struct RecordingSink {
    sender: Sender<Forward>,
    receiver: Receiver<Forward>,
    logger: Logger,
}

impl RecordingSink {
    pub fn new(logger: Logger) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        RecordingSink {
            sender,
            receiver,
            logger,
        }
    }

    /// Wait for the next forwarded packet.
    pub async fn recv_forward(&self) -> Result<Forward> {
        let forward = future::timeout(Duration::from_secs(1), self.receiver.recv()).await??;
        Ok(forward)
    }

    /// Check that nothing is forwarded within a short time.
    pub async fn expect_no_forward(&self) -> Result<()> {
        match future::timeout(Duration::from_millis(100), self.receiver.recv()).await {
            Err(_timed_out) => Ok(()),
            Ok(forward) => bail!("Unexpected forward {:?}", forward),
        }
    }
}

#[async_trait]
impl PacketSink for RecordingSink {
    async fn forward_to_apn(&self, gateway_address: Ipv4Addr, payload: Vec<u8>) -> Result<()> {
        info!(
            self.logger,
            "Forward {} bytes to APN gateway {}",
            payload.len(),
            gateway_address
        );
        self.sender
            .send(Forward::ToApn {
                gateway_address,
                payload,
            })
            .await?;
        Ok(())
    }

    async fn forward_to_peer_gateway(
        &self,
        peer_gateway_address: Ipv4Addr,
        peer_dp_teid: Teid,
        payload: Vec<u8>,
    ) -> Result<()> {
        info!(
            self.logger,
            "Forward {} bytes to SGW {} on {}",
            payload.len(),
            peer_gateway_address,
            peer_dp_teid
        );
        self.sender
            .send(Forward::ToPeerGateway {
                peer_gateway_address,
                peer_dp_teid,
                payload,
            })
            .await?;
        Ok(())
    }
}
