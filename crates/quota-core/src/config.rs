//! Configuration for quota queries
//!
//! Example config:
//! ```toml
//! [ldap]
//! server_url = "ldaps://ldap.example.edu:636"
//! search_base = "ou=People,dc=example,dc=edu"
//! member_attribute = "mail"
//!
//! [groups]
//! membership_attribute = "memberOf"
//! group_dn_template = "cn={name},ou=Groups,dc=example,dc=edu"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use crate::GROUP_NAME_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default)]
    pub ldap: LdapConfigSection,

    #[serde(default)]
    pub groups: GroupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QuotaConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        debug!("Loading configuration from {}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Configuration(format!("Failed to read config {}: {}", path, e))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from `QUOTA_*` variables resolved through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QUOTA_LDAP_URL") {
            self.ldap.server_url = url;
        }
        if let Some(dn) = lookup("QUOTA_BIND_DN") {
            self.ldap.bind_dn = dn;
        }
        if let Some(password) = lookup("QUOTA_BIND_PASSWORD") {
            self.ldap.bind_password = password;
        }
        if let Some(base) = lookup("QUOTA_SEARCH_BASE") {
            self.ldap.search_base = base;
        }
        if let Some(attr) = lookup("QUOTA_MEMBER_ATTRIBUTE") {
            self.ldap.member_attribute = attr;
        }
        if let Some(timeout) = lookup("QUOTA_LDAP_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.ldap.timeout_seconds = t;
            }
        }
        if let Some(start_tls) = lookup("QUOTA_LDAP_STARTTLS").and_then(|v| parse_bool(&v)) {
            self.ldap.start_tls = start_tls;
        }
        if let Some(skip) = lookup("QUOTA_LDAP_SKIP_TLS_VERIFY").and_then(|v| parse_bool(&v)) {
            self.ldap.skip_tls_verify = skip;
        }

        if let Some(attr) = lookup("QUOTA_GROUP_ATTRIBUTE") {
            self.groups.membership_attribute = attr;
        }
        if let Some(template) = lookup("QUOTA_GROUP_DN_TEMPLATE") {
            self.groups.group_dn_template = template;
        }

        if let Some(level) = lookup("QUOTA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("QUOTA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.ldap.validate()?;
        self.groups.validate()
    }
}

/// Unrecognized values yield `None` so the current setting is kept
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// LDAP server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfigSection {
    /// LDAP server URL (ldap:// or ldaps://)
    #[serde(default = "default_ldap_url")]
    pub server_url: String,

    /// Use STARTTLS for connection upgrade
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Bind DN; empty means anonymous
    #[serde(default)]
    pub bind_dn: String,

    #[serde(default)]
    pub bind_password: String,

    /// Base DN for member searches
    #[serde(default)]
    pub search_base: String,

    /// Connection timeout in seconds
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,

    /// Attribute listed for each member entry
    #[serde(default = "default_member_attr")]
    pub member_attribute: String,
}

fn default_ldap_url() -> String {
    "ldap://localhost:389".to_string()
}

fn default_ldap_timeout() -> u64 {
    10
}

fn default_member_attr() -> String {
    "uid".to_string()
}

impl Default for LdapConfigSection {
    fn default() -> Self {
        Self {
            server_url: default_ldap_url(),
            start_tls: false,
            skip_tls_verify: false,
            bind_dn: String::new(),
            bind_password: String::new(),
            search_base: String::new(),
            timeout_seconds: default_ldap_timeout(),
            member_attribute: default_member_attr(),
        }
    }
}

impl LdapConfigSection {
    pub fn is_anonymous(&self) -> bool {
        self.bind_dn.is_empty()
    }

    pub fn validate(&self) -> crate::Result<()> {
        let url = url::Url::parse(&self.server_url).map_err(|e| {
            crate::Error::Configuration(format!("Invalid server URL {}: {}", self.server_url, e))
        })?;

        match url.scheme() {
            "ldap" | "ldaps" | "ldapi" => {}
            other => {
                return Err(crate::Error::Configuration(format!(
                    "Server URL must use ldap://, ldaps:// or ldapi://, got {}://",
                    other
                )))
            }
        }

        if url.scheme() == "ldaps" && self.start_tls {
            return Err(crate::Error::Configuration(
                "STARTTLS cannot be combined with an ldaps:// URL".into(),
            ));
        }

        if self.search_base.is_empty() {
            return Err(crate::Error::Configuration(
                "Search base DN is required".into(),
            ));
        }

        Ok(())
    }
}

/// How group short-names become membership filter fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Attribute tested for group membership
    #[serde(default = "default_membership_attr")]
    pub membership_attribute: String,

    /// Group DN with `{name}` standing for the short-name
    #[serde(default = "default_group_dn_template")]
    pub group_dn_template: String,
}

fn default_membership_attr() -> String {
    "memberOf".to_string()
}

fn default_group_dn_template() -> String {
    "cn={name},ou=Groups,dc=example,dc=edu".to_string()
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            membership_attribute: default_membership_attr(),
            group_dn_template: default_group_dn_template(),
        }
    }
}

impl GroupConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.membership_attribute.is_empty() {
            return Err(crate::Error::Configuration(
                "Membership attribute is required".into(),
            ));
        }

        if !self.group_dn_template.contains(GROUP_NAME_PLACEHOLDER) {
            return Err(crate::Error::Configuration(format!(
                "Group DN template must contain {} placeholder",
                GROUP_NAME_PLACEHOLDER
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> QuotaConfig {
        let mut config = QuotaConfig::default();
        config.ldap.search_base = "ou=People,dc=example,dc=edu".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = QuotaConfig::default();
        assert_eq!(config.ldap.server_url, "ldap://localhost:389");
        assert_eq!(config.ldap.member_attribute, "uid");
        assert!(config.ldap.is_anonymous());
        assert_eq!(config.groups.membership_attribute, "memberOf");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = QuotaConfig::from_toml(
            r#"
            [ldap]
            server_url = "ldaps://ldap.example.edu:636"
            search_base = "ou=People,dc=example,dc=edu"

            [groups]
            membership_attribute = "isMemberOf"
            "#,
        )
        .unwrap();

        assert_eq!(config.ldap.server_url, "ldaps://ldap.example.edu:636");
        assert_eq!(config.ldap.timeout_seconds, 10);
        assert_eq!(config.groups.membership_attribute, "isMemberOf");
        assert_eq!(
            config.groups.group_dn_template,
            "cn={name},ou=Groups,dc=example,dc=edu"
        );
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = QuotaConfig::from_toml("[ldap\nserver_url = 1").unwrap_err();
        assert!(matches!(err, crate::Error::Configuration(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = QuotaConfig::from_file("/nonexistent/quota.toml").unwrap_err();
        assert!(matches!(err, crate::Error::Configuration(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QUOTA_LDAP_URL", "ldaps://dir.example.edu"),
            ("QUOTA_SEARCH_BASE", "dc=example,dc=edu"),
            ("QUOTA_LDAP_TIMEOUT", "not-a-number"),
            ("QUOTA_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = QuotaConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.ldap.server_url, "ldaps://dir.example.edu");
        assert_eq!(config.ldap.search_base, "dc=example,dc=edu");
        // Unparseable values keep the default
        assert_eq!(config.ldap.timeout_seconds, 10);
        assert_eq!(config.logging.format, "json");
        assert!(!config.ldap.start_tls);
    }

    #[test]
    fn test_env_tls_flags_both_directions() {
        let mut config = QuotaConfig::from_toml(
            r#"
            [ldap]
            start_tls = true
            "#,
        )
        .unwrap();
        assert!(config.ldap.start_tls);

        config.apply_env(|key| match key {
            "QUOTA_LDAP_STARTTLS" => Some("false".to_string()),
            "QUOTA_LDAP_SKIP_TLS_VERIFY" => Some("Yes".to_string()),
            _ => None,
        });
        assert!(!config.ldap.start_tls);
        assert!(config.ldap.skip_tls_verify);

        config.apply_env(|key| match key {
            "QUOTA_LDAP_STARTTLS" => Some("1".to_string()),
            "QUOTA_LDAP_SKIP_TLS_VERIFY" => Some("maybe".to_string()),
            _ => None,
        });
        assert!(config.ldap.start_tls);
        // Unrecognized values keep the current setting
        assert!(config.ldap.skip_tls_verify);
    }

    #[test]
    fn test_validation() {
        assert!(valid_config().validate().is_ok());

        let mut config = valid_config();
        config.ldap.search_base.clear();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.ldap.server_url = "http://ldap.example.edu".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.ldap.server_url = "ldaps://ldap.example.edu".to_string();
        config.ldap.start_tls = true;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.groups.group_dn_template = "cn=ual-faculty,ou=Groups".to_string();
        assert!(config.validate().is_err());
    }
}
