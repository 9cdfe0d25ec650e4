pub mod app_config;
pub mod cli;
pub mod event_handler;
pub mod processor;
pub mod startup;
