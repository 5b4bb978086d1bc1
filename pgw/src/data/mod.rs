mod apn;
mod bearer;
mod config;
mod pdn_connection;
mod teid;

pub use apn::*;
pub use bearer::*;
pub use config::*;
pub use pdn_connection::*;
pub use teid::*;
