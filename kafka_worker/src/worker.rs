mod builder;
mod events;
mod kafka_worker;
mod processor;

pub use builder::*;
pub use events::*;
pub use kafka_worker::*;
pub use processor::*;
