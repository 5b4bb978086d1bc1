mod mock_sink;
pub mod framework;

pub use mock_sink::{Forward, RecordingSink};
