//! Quota Query Core Library
//!
//! Error type and configuration shared by the quota query crates.

pub mod config;
pub mod error;

pub use config::QuotaConfig;
pub use error::{Error, Result};

/// Quota query version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder substituted with the group short-name in `group_dn_template`
pub const GROUP_NAME_PLACEHOLDER: &str = "{name}";
