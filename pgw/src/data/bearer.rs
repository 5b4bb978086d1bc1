use super::Teid;

/// A data-plane tunnel within a PDN connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bearer {
    /// Our end of the tunnel.  Unique among live bearers.
    pub dp_teid: Teid,

    /// The SGW's end of the tunnel.
    pub peer_dp_teid: Teid,

    /// The owning PDN connection.  This is a lookup key rather than a reference, so a
    /// bearer never keeps a deleted session alive.
    pub cp_teid: Teid,
}

impl std::fmt::Display for Bearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.dp_teid, self.peer_dp_teid)
    }
}
