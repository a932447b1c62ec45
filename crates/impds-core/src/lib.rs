//! IMPDS Dedup Core - Foundation crate for the duplicate-beneficiary lookup service.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other crates in the workspace depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes (`RationCardNo`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, CryptoConfig, LoginConfig, PortalConfig, SearchConfig, ServerConfig, SessionConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use types::RationCardNo;
