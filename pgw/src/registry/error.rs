use crate::Teid;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("APN {0} is not registered")]
    UnknownApn(String),

    #[error("No free {resource} within the allocation budget")]
    AllocationExhausted { resource: Resource },

    #[error("PDN connection {0} does not exist")]
    UnknownSession(Teid),
}

/// The identifier space that ran dry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    ControlTeid,
    DataTeid,
    SubscriberAddress { apn: String },
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::ControlTeid => write!(f, "control plane TEID"),
            Resource::DataTeid => write!(f, "data plane TEID"),
            Resource::SubscriberAddress { apn } => write!(f, "subscriber address in APN {apn}"),
        }
    }
}
