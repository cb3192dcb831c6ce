//! Sea Core Library
//!
//! This crate provides the pieces every sea job runs against: the error
//! type, the configuration store and its loader, and the application
//! context provider that jobs are executed inside.

pub mod app;
pub mod config;
pub mod error;

pub use app::{App, ContextProvider, Resource};
pub use config::{AppSettings, ConfigLoader, ConfigStore};
pub use error::{Error, Result};

/// Environment name used when neither `--env` nor `SEA_ENV` is given
pub const DEFAULT_ENV: &str = "development";
