//! LDAP quota class queries
//!
//! Builds the membership filters for the faculty, grad and ugrad quota
//! classes and runs them against a directory.

pub mod filter;
pub mod group;
pub mod ldap;

pub use filter::{build_quota_filter, build_quota_filter_for, QuotaClass};
pub use group::{GroupBase, GrouperBase};
pub use ldap::{quota_members, Directory, LdapDirectory, LdapEntry};
