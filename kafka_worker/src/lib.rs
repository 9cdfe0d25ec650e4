pub mod connection_settings;
pub mod consumer;
pub mod error;
pub mod message;
pub mod worker;
