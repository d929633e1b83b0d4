//! Group short-name to membership fragment mapping

use quota_core::config::GroupConfig;
use quota_core::GROUP_NAME_PLACEHOLDER;

/// Resolves a group short-name (e.g. `ual-faculty`) into the fragment placed
/// inside a filter component, such as `memberOf=cn=ual-faculty,ou=Groups,...`.
///
/// Implementations must be deterministic.
pub trait GroupBase {
    fn group_base(&self, short_name: &str) -> String;
}

impl<F> GroupBase for F
where
    F: Fn(&str) -> String,
{
    fn group_base(&self, short_name: &str) -> String {
        self(short_name)
    }
}

/// Template-driven group base built from the `[groups]` config section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrouperBase {
    membership_attribute: String,
    group_dn_template: String,
}

impl GrouperBase {
    pub fn new(
        membership_attribute: impl Into<String>,
        group_dn_template: impl Into<String>,
    ) -> Self {
        Self {
            membership_attribute: membership_attribute.into(),
            group_dn_template: group_dn_template.into(),
        }
    }

    pub fn from_config(config: &GroupConfig) -> Self {
        Self::new(&config.membership_attribute, &config.group_dn_template)
    }

    /// Group DN for a short-name, without the membership attribute
    pub fn group_dn(&self, short_name: &str) -> String {
        self.group_dn_template
            .replace(GROUP_NAME_PLACEHOLDER, short_name)
    }
}

impl Default for GrouperBase {
    fn default() -> Self {
        Self::from_config(&GroupConfig::default())
    }
}

impl GroupBase for GrouperBase {
    fn group_base(&self, short_name: &str) -> String {
        format!("{}={}", self.membership_attribute, self.group_dn(short_name))
    }
}
