//! members command - list the members of a quota class

use super::CommandContext;
use anyhow::{Context, Result};
use quota_ldap::{quota_members, GrouperBase, LdapDirectory, QuotaClass};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct MembersResult<'a> {
    class: QuotaClass,
    attribute: &'a str,
    count: usize,
    members: &'a [String],
}

pub async fn execute(ctx: &CommandContext, class: QuotaClass, attr: Option<&str>) -> Result<()> {
    ctx.config.validate()?;

    let attr = attr.unwrap_or(ctx.config.ldap.member_attribute.as_str());
    let base = GrouperBase::from_config(&ctx.config.groups);

    info!("Listing {} ({}) by {}", class, class.description(), attr);

    let mut directory = LdapDirectory::connect(&ctx.config.ldap)
        .await
        .with_context(|| format!("Could not connect to {}", ctx.config.ldap.server_url))?;

    let result = quota_members(&mut directory, class, &base, attr).await;
    directory.unbind().await;
    let members = result?;

    println!("{}", render(ctx, class, attr, &members)?);
    Ok(())
}

fn render(ctx: &CommandContext, class: QuotaClass, attr: &str, members: &[String]) -> Result<String> {
    if ctx.is_json() {
        let result = MembersResult {
            class,
            attribute: attr,
            count: members.len(),
            members,
        };
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(members.join("\n"))
    }
}
