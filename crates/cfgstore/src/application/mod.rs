//! Application layer: the config store use cases.

pub mod config_store;
