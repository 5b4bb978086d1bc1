use super::Teid;
use std::net::Ipv4Addr;

/// A subscriber's attachment to an APN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnConnection {
    pub cp_teid: Teid,
    pub apn: String,
    pub apn_gateway_address: Ipv4Addr,
    pub subscriber_address: Ipv4Addr,

    // SGW control endpoint
    pub peer_gateway_address: Ipv4Addr,
    pub peer_cp_teid: Teid,

    // dp_teids of the bearers owned by this connection, oldest first.
    pub bearers: Vec<Teid>,
    pub default_bearer: Option<Teid>,
}

impl PdnConnection {
    pub fn new(
        cp_teid: Teid,
        apn: &str,
        apn_gateway_address: Ipv4Addr,
        subscriber_address: Ipv4Addr,
        peer_gateway_address: Ipv4Addr,
        peer_cp_teid: Teid,
    ) -> Self {
        PdnConnection {
            cp_teid,
            apn: apn.to_string(),
            apn_gateway_address,
            subscriber_address,
            peer_gateway_address,
            peer_cp_teid,
            bearers: vec![],
            default_bearer: None,
        }
    }

    pub fn owns_bearer(&self, dp_teid: Teid) -> bool {
        self.bearers.contains(&dp_teid)
    }

    pub(crate) fn attach_bearer(&mut self, dp_teid: Teid, make_default: bool) {
        self.bearers.push(dp_teid);
        if make_default || self.default_bearer.is_none() {
            self.default_bearer = Some(dp_teid);
        }
    }

    pub(crate) fn detach_bearer(&mut self, dp_teid: Teid) {
        self.bearers.retain(|b| *b != dp_teid);
        if self.default_bearer == Some(dp_teid) {
            self.default_bearer = None;
        }
    }
}

impl std::fmt::Display for PdnConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{},{})",
            self.cp_teid, self.apn, self.subscriber_address
        )
    }
}
