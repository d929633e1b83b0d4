//! filter command - print the LDAP filter for a quota class

use super::CommandContext;
use anyhow::Result;
use quota_ldap::{build_quota_filter, GrouperBase, QuotaClass};
use serde::Serialize;

#[derive(Serialize)]
struct FilterResult<'a> {
    class: QuotaClass,
    groups: &'a [&'static str],
    filters: &'a [String],
}

pub fn execute(ctx: &CommandContext, class: QuotaClass) -> Result<()> {
    println!("{}", render(ctx, class)?);
    Ok(())
}

pub(crate) fn render(ctx: &CommandContext, class: QuotaClass) -> Result<String> {
    ctx.config.groups.validate()?;

    let base = GrouperBase::from_config(&ctx.config.groups);
    let filters = build_quota_filter(class, &base);

    if ctx.is_json() {
        let result = FilterResult {
            class,
            groups: class.group_names(),
            filters: &filters,
        };
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(filters.join("\n"))
    }
}
