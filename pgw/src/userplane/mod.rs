mod dispatcher;
mod downlink_pipeline;
mod stats;
mod uplink_pipeline;

pub use dispatcher::{Dispatch, PacketDispatcher, PacketSink};
pub use downlink_pipeline::{DownlinkCounters, DownlinkPacket, DownlinkPipeline};
pub use stats::dump_stats;
pub use uplink_pipeline::{UplinkCounters, UplinkPacket, UplinkPipeline};
