//! Quota class filters
//!
//! Each quota class maps to a fixed set of groups. A class backed by a single
//! group yields `(<fragment>)`; a class backed by several yields an OR filter
//! `(|(<f1>)(<f2>)...)`. Filters follow RFC 4515 and carry no whitespace
//! between components.

use crate::group::GroupBase;
use quota_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Population classes with a default quota tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaClass {
    /// Faculty, staff and DCC
    Faculty,
    /// Graduate students
    Grad,
    /// Undergraduate students
    Ugrad,
}

impl QuotaClass {
    pub const ALL: [QuotaClass; 3] = [QuotaClass::Faculty, QuotaClass::Grad, QuotaClass::Ugrad];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaClass::Faculty => "faculty",
            QuotaClass::Grad => "grad",
            QuotaClass::Ugrad => "ugrad",
        }
    }

    /// Group short-names whose members make up this class, in filter order
    pub fn group_names(&self) -> &'static [&'static str] {
        match self {
            QuotaClass::Faculty => &["ual-faculty", "ual-staff", "ual-dcc"],
            QuotaClass::Grad => &["ual-grads"],
            QuotaClass::Ugrad => &["ual-ugrads"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QuotaClass::Faculty => "faculty, staff, and dcc",
            QuotaClass::Grad => "graduate students",
            QuotaClass::Ugrad => "undergraduate students",
        }
    }
}

impl fmt::Display for QuotaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotaClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QuotaClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "quota class must be either 'faculty', 'grad', or 'ugrad', got '{}'",
                    s
                ))
            })
    }
}

/// Build the search filter for a quota class.
///
/// Returns a one-element list, the form directory searches take.
pub fn build_quota_filter<B>(class: QuotaClass, base: &B) -> Vec<String>
where
    B: GroupBase + ?Sized,
{
    let filter = match class.group_names() {
        [single] => format!("({})", base.group_base(single)),
        names => {
            let components: String = names
                .iter()
                .map(|name| format!("({})", base.group_base(name)))
                .collect();
            format!("(|{})", components)
        }
    };

    debug!(class = %class, filter = %filter, "Built quota filter");

    vec![filter]
}

/// Parse `tag` and build its filter; unknown tags fail with `InvalidArgument`
pub fn build_quota_filter_for<B>(tag: &str, base: &B) -> Result<Vec<String>>
where
    B: GroupBase + ?Sized,
{
    let class: QuotaClass = tag.parse()?;
    Ok(build_quota_filter(class, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GrouperBase;

    fn fragment(name: &str) -> String {
        format!("memberOf=cn={},ou=Groups,dc=example,dc=edu", name)
    }

    fn is_balanced(filter: &str) -> bool {
        let mut depth: i32 = 0;
        for c in filter.chars() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    #[test]
    fn test_all_classes_yield_single_balanced_filter() {
        let base = GrouperBase::default();
        for class in QuotaClass::ALL {
            let filters = build_quota_filter(class, &base);
            assert_eq!(filters.len(), 1, "{}", class);
            assert!(!filters[0].is_empty());
            assert!(is_balanced(&filters[0]), "{}", filters[0]);
        }
    }

    #[test]
    fn test_faculty_filter() {
        let filters = build_quota_filter(QuotaClass::Faculty, &fragment);
        assert_eq!(
            filters,
            vec![format!(
                "(|({})({})({}))",
                fragment("ual-faculty"),
                fragment("ual-staff"),
                fragment("ual-dcc")
            )]
        );

        let filter = &filters[0];
        assert!(filter.starts_with("(|("));
        assert!(filter.ends_with("))"));
        assert_eq!(filter.matches('|').count(), 1);
        assert_eq!(filter.matches("memberOf=").count(), 3);
    }

    #[test]
    fn test_grad_filter() {
        assert_eq!(
            build_quota_filter(QuotaClass::Grad, &fragment),
            vec![format!("({})", fragment("ual-grads"))]
        );
    }

    #[test]
    fn test_ugrad_filter() {
        assert_eq!(
            build_quota_filter(QuotaClass::Ugrad, &fragment),
            vec!["(memberOf=cn=ual-ugrads,ou=Groups,dc=example,dc=edu)".to_string()]
        );
    }

    #[test]
    fn test_invalid_tag() {
        let err = build_quota_filter_for("invalid", &fragment).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("'invalid'"));

        // Tags are case-sensitive
        assert!(build_quota_filter_for("Faculty", &fragment).is_err());
        assert!(build_quota_filter_for("", &fragment).is_err());
    }

    #[test]
    fn test_string_tags() {
        assert_eq!(
            build_quota_filter_for("grad", &fragment).unwrap(),
            build_quota_filter(QuotaClass::Grad, &fragment)
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let base = GrouperBase::default();
        for class in QuotaClass::ALL {
            assert_eq!(
                build_quota_filter(class, &base),
                build_quota_filter(class, &base)
            );
        }
    }

    #[test]
    fn test_group_base_called_in_order() {
        let seen = std::cell::RefCell::new(Vec::new());
        let base = |name: &str| {
            seen.borrow_mut().push(name.to_string());
            format!("cn={}", name)
        };

        build_quota_filter(QuotaClass::Faculty, &base);
        assert_eq!(*seen.borrow(), vec!["ual-faculty", "ual-staff", "ual-dcc"]);
    }

    #[test]
    fn test_class_round_trip() {
        for class in QuotaClass::ALL {
            assert_eq!(class.to_string().parse::<QuotaClass>().unwrap(), class);
        }
        assert_eq!(
            serde_json::to_string(&QuotaClass::Ugrad).unwrap(),
            "\"ugrad\""
        );
    }
}
