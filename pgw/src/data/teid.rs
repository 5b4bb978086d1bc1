/// Tunnel endpoint identifier.  Used for both the control plane (cp_teid) and
/// the data plane (dp_teid) namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Teid(pub u32);

impl Teid {
    /// Zero never names a live tunnel.
    pub const RESERVED: Teid = Teid(0);

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for Teid {
    fn from(value: u32) -> Self {
        Teid(value)
    }
}

impl From<[u8; 4]> for Teid {
    fn from(bytes: [u8; 4]) -> Self {
        Teid(u32::from_be_bytes(bytes))
    }
}

impl std::fmt::Display for Teid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_be_bytes()))
    }
}
