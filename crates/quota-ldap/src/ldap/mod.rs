//! LDAP directory access
//!
//! Provides:
//! - Connection and bind (plain, LDAPS, STARTTLS, anonymous)
//! - Multi-filter subtree searches
//! - Member listing for quota classes

mod client;
mod types;

pub use client::{quota_members, Directory, LdapDirectory};
pub use types::*;
