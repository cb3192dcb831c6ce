//! Configuration module
//!
//! Application configuration is a flat, mutable key-value store. Jobs read
//! and write it through their execution context; the loader fills it from
//! `configs/` files and `SEA_CONFIG_*` environment variables.

mod loader;
mod store;
mod types;

pub use loader::{ConfigLoader, ENV_OVERRIDE_PREFIX};
pub use store::ConfigStore;
pub use types::AppSettings;
