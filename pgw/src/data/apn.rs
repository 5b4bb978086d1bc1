use derive_deref::Deref;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// APN name -> gateway address.  Several APNs may share a gateway.
#[derive(Deref, Debug, Default, Clone)]
pub struct ApnTable(HashMap<String, Ipv4Addr>);

impl ApnTable {
    pub fn register(&mut self, name: &str, gateway_address: Ipv4Addr) -> Option<Ipv4Addr> {
        self.0.insert(name.to_string(), gateway_address)
    }

    pub fn gateway(&self, name: &str) -> Option<Ipv4Addr> {
        self.0.get(name).copied()
    }
}
