//! uptick-core — shared types and configuration for the uptick poller.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ServiceConfig, UptickConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
