use super::allocator::{self, AllocationPolicy};
use super::{RegistryError, Resource};
use crate::{ApnTable, Bearer, PdnConnection, Teid};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How a new bearer relates to its session's default bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultBearerPolicy {
    /// Default only if the session has no default bearer yet.
    #[default]
    FirstBearer,
    /// Becomes the default, replacing any existing one.
    MakeDefault,
}

/// Where an uplink packet on a given dp_teid goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UplinkRoute {
    pub apn_gateway_address: Ipv4Addr,
}

/// Where a downlink packet for a given subscriber goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownlinkRoute {
    pub peer_gateway_address: Ipv4Addr,
    pub peer_dp_teid: Teid,
}

/// Why a packet has nowhere to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMiss {
    UnknownTeid,
    UnknownSubscriber,
    NoDefaultBearer,
}

#[derive(Default)]
struct Indices {
    apns: ApnTable,
    sessions: HashMap<Teid, PdnConnection>,
    sessions_by_address: HashMap<Ipv4Addr, Teid>,
    bearers: HashMap<Teid, Bearer>,
}

/// The control plane state of the gateway: APNs, PDN connections and bearers.
///
/// All three indices, and every session's bearer list, sit behind a single lock so that
/// no reader can see a session in one index but not another.  Clones share state.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    indices: Arc<RwLock<Indices>>,
    policy: Arc<AllocationPolicy>,
}

impl SessionRegistry {
    pub fn new(policy: AllocationPolicy) -> Self {
        SessionRegistry {
            indices: Arc::new(RwLock::new(Indices::default())),
            policy: Arc::new(policy),
        }
    }

    // The indices are only mutated by code that cannot panic half way through an
    // update, so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Indices> {
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indices> {
        self.indices.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Add or replace an APN.  Returns the previous gateway, if any.
    pub fn register_apn(&self, name: &str, gateway_address: Ipv4Addr) -> Option<Ipv4Addr> {
        self.write().apns.register(name, gateway_address)
    }

    pub fn apn_gateway(&self, name: &str) -> Option<Ipv4Addr> {
        self.read().apns.gateway(name)
    }

    pub fn create_session(
        &self,
        apn: &str,
        peer_gateway_address: Ipv4Addr,
        peer_cp_teid: Teid,
    ) -> Result<PdnConnection, RegistryError> {
        let mut rng = rand::rng();
        let mut indices = self.write();
        let apn_gateway_address = indices
            .apns
            .gateway(apn)
            .ok_or_else(|| RegistryError::UnknownApn(apn.to_string()))?;

        let cp_teid = allocator::allocate(
            &mut rng,
            self.policy.teid_range.clone(),
            self.policy.max_attempts,
            |v| indices.sessions.contains_key(&Teid(v)),
        )
        .map(Teid)
        .ok_or(RegistryError::AllocationExhausted {
            resource: Resource::ControlTeid,
        })?;

        let subscriber_address = allocator::allocate_host_address(
            &mut rng,
            apn_gateway_address,
            &self.policy,
            |a| indices.sessions_by_address.contains_key(&a),
        )
        .ok_or_else(|| RegistryError::AllocationExhausted {
            resource: Resource::SubscriberAddress {
                apn: apn.to_string(),
            },
        })?;

        let session = PdnConnection::new(
            cp_teid,
            apn,
            apn_gateway_address,
            subscriber_address,
            peer_gateway_address,
            peer_cp_teid,
        );
        indices.sessions_by_address.insert(subscriber_address, cp_teid);
        indices.sessions.insert(cp_teid, session.clone());
        Ok(session)
    }

    /// Delete a PDN connection and all of its bearers.  Returns the deleted connection,
    /// or None if it did not exist.
    pub fn delete_session(&self, cp_teid: Teid) -> Option<PdnConnection> {
        let mut indices = self.write();
        let session = indices.sessions.remove(&cp_teid)?;
        indices.sessions_by_address.remove(&session.subscriber_address);
        for dp_teid in session.bearers.iter() {
            indices.bearers.remove(dp_teid);
        }
        Some(session)
    }

    /// Create a bearer in `session`.  The first bearer of a session becomes its default
    /// bearer.
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
        let cp_teid = session.cp_teid;
        let mut rng = rand::rng();
        let mut indices = self.write();

        // The caller's snapshot may be stale.
        if !indices.sessions.contains_key(&cp_teid) {
            return Err(RegistryError::UnknownSession(cp_teid));
        }

        let dp_teid = allocator::allocate(
            &mut rng,
            self.policy.teid_range.clone(),
            self.policy.max_attempts,
            |v| indices.bearers.contains_key(&Teid(v)),
        )
        .map(Teid)
        .ok_or(RegistryError::AllocationExhausted {
            resource: Resource::DataTeid,
        })?;

        let bearer = Bearer {
            dp_teid,
            peer_dp_teid,
            cp_teid,
        };
        indices.bearers.insert(dp_teid, bearer.clone());
        if let Some(owner) = indices.sessions.get_mut(&cp_teid) {
            owner.attach_bearer(dp_teid, default_policy == DefaultBearerPolicy::MakeDefault);
        }
        Ok(bearer)
    }

    /// Delete a single bearer.  Returns the deleted bearer, or None if it did not exist.
    pub fn delete_bearer(&self, dp_teid: Teid) -> Option<Bearer> {
        let mut indices = self.write();
        let bearer = indices.bearers.remove(&dp_teid)?;
        if let Some(owner) = indices.sessions.get_mut(&bearer.cp_teid) {
            owner.detach_bearer(dp_teid);
        }
        Some(bearer)
    }

    pub fn find_session_by_cp_teid(&self, cp_teid: Teid) -> Option<PdnConnection> {
        self.read().sessions.get(&cp_teid).cloned()
    }

    pub fn find_session_by_subscriber_address(
        &self,
        subscriber_address: Ipv4Addr,
    ) -> Option<PdnConnection> {
        let indices = self.read();
        let cp_teid = indices.sessions_by_address.get(&subscriber_address)?;
        indices.sessions.get(cp_teid).cloned()
    }

    pub fn find_bearer_by_dp_teid(&self, dp_teid: Teid) -> Option<Bearer> {
        self.read().bearers.get(&dp_teid).cloned()
    }

    /// Resolve an uplink dp_teid to its APN gateway under a single read lock.
    pub fn uplink_route(&self, dp_teid: Teid) -> Result<UplinkRoute, RouteMiss> {
        let indices = self.read();
        let session = indices
            .bearers
            .get(&dp_teid)
            .and_then(|bearer| indices.sessions.get(&bearer.cp_teid))
            .ok_or(RouteMiss::UnknownTeid)?;
        Ok(UplinkRoute {
            apn_gateway_address: session.apn_gateway_address,
        })
    }

    /// Resolve a subscriber address to its SGW endpoint under a single read lock.
    pub fn downlink_route(&self, subscriber_address: Ipv4Addr) -> Result<DownlinkRoute, RouteMiss> {
        let indices = self.read();
        let session = indices
            .sessions_by_address
            .get(&subscriber_address)
            .and_then(|cp_teid| indices.sessions.get(cp_teid))
            .ok_or(RouteMiss::UnknownSubscriber)?;
        let bearer = session
            .default_bearer
            .and_then(|dp_teid| indices.bearers.get(&dp_teid))
            .ok_or(RouteMiss::NoDefaultBearer)?;
        Ok(DownlinkRoute {
            peer_gateway_address: session.peer_gateway_address,
            peer_dp_teid: bearer.peer_dp_teid,
        })
    }

    pub fn session_count(&self) -> usize {
        self.read().sessions.len()
    }

    pub fn bearer_count(&self) -> usize {
        self.read().bearers.len()
    }
}
