//! LDAP Client implementation
//!
//! Handles LDAP connections, binds, and member searches.
//! Supports LDAP, LDAPS (SSL), and STARTTLS connections.

use crate::filter::{build_quota_filter, QuotaClass};
use crate::group::GroupBase;
use crate::ldap::types::LdapEntry;
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use quota_core::config::LdapConfigSection;
use quota_core::{Error, Result};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something that can run filter searches, usually an LDAP server
#[async_trait]
pub trait Directory: Send {
    /// Run every filter and return the matching entries in filter order
    async fn search(&mut self, filters: &[String], attrs: &[String]) -> Result<Vec<LdapEntry>>;
}

/// Bound connection to an LDAP server
pub struct LdapDirectory {
    ldap: Ldap,
    search_base: String,
    server_url: String,
}

impl LdapDirectory {
    /// Connect and bind using the `[ldap]` settings
    pub async fn connect(config: &LdapConfigSection) -> Result<Self> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(config.timeout_seconds))
            .set_starttls(config.start_tls)
            .set_no_tls_verify(config.skip_tls_verify);

        debug!("Connecting to LDAP server: {}", config.server_url);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &config.server_url)
            .await
            .map_err(|e| {
                Error::Connection(format!("Failed to connect to {}: {}", config.server_url, e))
            })?;

        ldap3::drive!(conn);

        if config.is_anonymous() {
            debug!("No bind DN configured, using anonymous access");
        } else {
            let result = ldap
                .simple_bind(&config.bind_dn, &config.bind_password)
                .await
                .map_err(|e| Error::Bind(e.to_string()))?;

            if result.rc != 0 {
                return Err(Error::Bind(format!(
                    "Bind as {} failed with code: {}",
                    config.bind_dn, result.rc
                )));
            }
        }

        info!("Connected to LDAP server {}", config.server_url);

        Ok(Self {
            ldap,
            search_base: config.search_base.clone(),
            server_url: config.server_url.clone(),
        })
    }

    /// Close the connection; failures are logged, not returned
    pub async fn unbind(mut self) {
        match self.ldap.unbind().await {
            Ok(()) => debug!("Unbound from {}", self.server_url),
            Err(e) => warn!("Unbind from {} failed: {}", self.server_url, e),
        }
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn search(&mut self, filters: &[String], attrs: &[String]) -> Result<Vec<LdapEntry>> {
        let mut entries = Vec::new();

        for filter in filters {
            debug!(base = %self.search_base, filter = %filter, "Searching directory");

            let (rs, _res) = self
                .ldap
                .search(&self.search_base, Scope::Subtree, filter, attrs.to_vec())
                .await
                .map_err(|e| Error::Search(format!("{}: {}", filter, e)))?
                .success()
                .map_err(|e| Error::Search(format!("{}: {}", filter, e)))?;

            debug!("Filter {} matched {} entries", filter, rs.len());

            entries.extend(
                rs.into_iter()
                    .map(SearchEntry::construct)
                    .map(LdapEntry::from),
            );
        }

        Ok(entries)
    }
}

/// List the `attr` value of every member of `class`, sorted and de-duplicated.
///
/// Entries without the attribute are skipped.
pub async fn quota_members<D, B>(
    directory: &mut D,
    class: QuotaClass,
    base: &B,
    attr: &str,
) -> Result<Vec<String>>
where
    D: Directory + ?Sized,
    B: GroupBase + ?Sized,
{
    let filters = build_quota_filter(class, base);
    let entries = directory.search(&filters, &[attr.to_string()]).await?;

    let mut missing = 0usize;
    let mut members = BTreeSet::new();
    for entry in &entries {
        match entry.get_attr(attr) {
            Some(value) => {
                members.insert(value.to_string());
            }
            None => missing += 1,
        }
    }

    if missing > 0 {
        debug!("{} entries had no {} attribute", missing, attr);
    }
    info!(class = %class, members = members.len(), "Listed quota class members");

    Ok(members.into_iter().collect())
}
