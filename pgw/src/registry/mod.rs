pub mod allocator;
mod error;
mod session_registry;

pub use allocator::AllocationPolicy;
pub use error::*;
pub use session_registry::*;
