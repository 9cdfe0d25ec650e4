mod consumer_settings;
mod consumer_wrapper;
mod context;
mod factory;
mod rebalance_policy;
mod record;

pub use consumer_settings::auto_offset_reset::*;
pub use consumer_settings::security_protocol::*;
pub use consumer_wrapper::*;
pub use context::*;
pub use factory::*;
pub use rebalance_policy::*;
pub use record::*;
