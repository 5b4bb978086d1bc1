mod data;
mod pgw;
pub mod registry;
pub mod userplane;

pub use data::*;
pub use pgw::Pgw;
pub use registry::{DefaultBearerPolicy, RegistryError};
pub use userplane::{Dispatch, PacketDispatcher, PacketSink};
