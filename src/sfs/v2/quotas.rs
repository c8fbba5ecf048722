//! Project quotas.
//!
//! `2.7` moved the resource from `/os-quota-sets` to `/quota-sets`. Later
//! versions widen what can be asked for and set:
//!
//! | version | adds                                          |
//! |---------|-----------------------------------------------|
//! | 2.25    | `detail` (usage/reserved breakdown)           |
//! | 2.39    | per share type quotas (`share_type` filter)   |
//! | 2.40    | `share_groups`, `share_group_snapshots`       |
//! | 2.53    | `share_replicas`, `replica_gigabytes`         |
//! | 2.62    | `per_share_gigabytes`                         |

use super::Builder;
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use crate::version::ApiVersion;
use serde_json::Value;

const LEGACY_PATH: &str = "/os-quota-sets";
const PATH: &str = "/quota-sets";

const BASE_FIELDS: &[&str] = &[
    "shares",
    "snapshots",
    "gigabytes",
    "snapshot_gigabytes",
    "share_networks",
    "force",
];
const GROUP_FIELDS: &[&str] = &["share_groups", "share_group_snapshots"];
const REPLICA_FIELDS: &[&str] = &["share_replicas", "replica_gigabytes"];
const PER_SHARE_FIELDS: &[&str] = &["per_share_gigabytes"];

/// Quota scope: a whole project, one user in it, or one share type in it.
#[derive(Debug, Clone, Default)]
pub struct QuotaTarget {
    pub project_id: String,
    pub user_id: Option<String>,
    pub share_type: Option<String>,
}

impl QuotaTarget {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    fn to_call(&self) -> Result<Call> {
        if self.project_id.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a project id is required".to_string(),
            ));
        }
        if self.user_id.is_some() && self.share_type.is_some() {
            return Err(SfsError::InvalidArgument(
                "user_id and share_type cannot be combined".to_string(),
            ));
        }
        let filters = QueryFilters::new()
            .with_opt("user_id", self.user_id.as_deref())
            .with_opt("share_type", self.share_type.as_deref());
        Ok(Call::on(self.project_id.as_str()).filters(filters))
    }
}

/// New limits; unset fields are left unchanged by the service.
#[derive(Debug, Clone, Default)]
pub struct QuotaUpdate {
    pub shares: Option<i64>,
    pub snapshots: Option<i64>,
    pub gigabytes: Option<i64>,
    pub snapshot_gigabytes: Option<i64>,
    pub share_networks: Option<i64>,
    pub share_groups: Option<i64>,
    pub share_group_snapshots: Option<i64>,
    pub share_replicas: Option<i64>,
    pub replica_gigabytes: Option<i64>,
    pub per_share_gigabytes: Option<i64>,
    pub force: bool,
}

impl QuotaUpdate {
    fn limits(&self) -> [(&'static str, Option<i64>); 10] {
        [
            ("shares", self.shares),
            ("snapshots", self.snapshots),
            ("gigabytes", self.gigabytes),
            ("snapshot_gigabytes", self.snapshot_gigabytes),
            ("share_networks", self.share_networks),
            ("share_groups", self.share_groups),
            ("share_group_snapshots", self.share_group_snapshots),
            ("share_replicas", self.share_replicas),
            ("replica_gigabytes", self.replica_gigabytes),
            ("per_share_gigabytes", self.per_share_gigabytes),
        ]
    }
}

pub struct Quotas<'c> {
    client: &'c Client,
}

impl<'c> Quotas<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn get(&self, target: &QuotaTarget, detail: bool) -> Result<Resource> {
        let call = target.to_call()?.param_opt("detail", detail.then_some(true));
        let body = self.client.invoke("quotas.get", &call)?;
        Resource::from_body("quota_set", body, "quota_set")
    }

    pub fn defaults(&self, project_id: &str) -> Result<Resource> {
        let call = QuotaTarget::project(project_id).to_call()?;
        let body = self.client.invoke("quotas.defaults", &call)?;
        Resource::from_body("quota_set", body, "quota_set")
    }

    pub fn update(&self, target: &QuotaTarget, update: &QuotaUpdate) -> Result<Resource> {
        let mut call = target.to_call()?;
        for (field, limit) in update.limits() {
            if let Some(limit) = limit {
                if limit < -1 {
                    return Err(SfsError::InvalidArgument(format!(
                        "{} must be -1 (unlimited) or greater (got {})",
                        field, limit
                    )));
                }
                call = call.param(field, limit);
            }
        }
        if call.params().is_empty() {
            return Err(SfsError::InvalidArgument(
                "at least one quota limit must be given".to_string(),
            ));
        }
        let call = call.param_opt("force", update.force.then_some(true));
        let body = self.client.invoke("quotas.update", &call)?;
        Resource::from_body("quota_set", body, "quota_set")
    }

    /// Resets the target's quotas to the defaults.
    pub fn delete(&self, target: &QuotaTarget) -> Result<()> {
        self.client.invoke("quotas.delete", &target.to_call()?)?;
        Ok(())
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("quotas.get", "2.0", Some("2.6"), get_legacy)?
        .register("quotas.get", "2.7", Some("2.24"), get_v2_7)?
        .register("quotas.get", "2.25", Some("2.38"), get_v2_25)?
        .register("quotas.get", "2.39", None, get_v2_39)?
        .register("quotas.defaults", "2.0", Some("2.6"), defaults_legacy)?
        .register("quotas.defaults", "2.7", None, defaults)?
        .register("quotas.update", "2.0", Some("2.6"), update_legacy)?
        .register("quotas.update", "2.7", Some("2.38"), update_v2_7)?
        .register("quotas.update", "2.39", Some("2.39"), update_v2_39)?
        .register("quotas.update", "2.40", Some("2.52"), update_v2_40)?
        .register("quotas.update", "2.53", Some("2.61"), update_v2_53)?
        .register("quotas.update", "2.62", None, update_v2_62)?
        .register("quotas.delete", "2.0", Some("2.6"), delete_legacy)?
        .register("quotas.delete", "2.7", Some("2.38"), delete_v2_7)?
        .register("quotas.delete", "2.39", None, delete_v2_39)?;
    Ok(())
}

/// Refuses filters the negotiated version cannot express.
fn check_filters(call: &Call, allowed: &[&str], version: ApiVersion) -> Result<()> {
    match call.query().iter().find(|(key, _)| !allowed.contains(key)) {
        Some((key, _)) => Err(SfsError::InvalidArgument(format!(
            "'{}' is not supported at API version {}",
            key, version
        ))),
        None => Ok(()),
    }
}

fn get_with(
    ctx: &CallContext<'_>,
    call: &Call,
    base: &str,
    filters: &[&str],
    detail_allowed: bool,
) -> Result<Option<Value>> {
    check_filters(call, filters, ctx.version())?;
    let detail = call.get("detail").and_then(Value::as_bool).unwrap_or(false);
    if detail && !detail_allowed {
        return Err(SfsError::InvalidArgument(format!(
            "'detail' is not supported at API version {}",
            ctx.version()
        )));
    }
    let suffix = if detail { "/detail" } else { "" };
    ctx.get(&format!(
        "{}/{}{}{}",
        base,
        call.target()?,
        suffix,
        call.query().to_query_string()
    ))
}

fn get_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_with(ctx, call, LEGACY_PATH, &["user_id"], false)
}

fn get_v2_7(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_with(ctx, call, PATH, &["user_id"], false)
}

fn get_v2_25(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_with(ctx, call, PATH, &["user_id"], true)
}

fn get_v2_39(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_with(ctx, call, PATH, &["user_id", "share_type"], true)
}

fn defaults_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.get(&format!("{}/{}/defaults", LEGACY_PATH, call.target()?))
}

fn defaults(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.get(&format!("{}/{}/defaults", PATH, call.target()?))
}

fn update_with(
    ctx: &CallContext<'_>,
    call: &Call,
    base: &str,
    filters: &[&str],
    field_groups: &[&[&str]],
) -> Result<Option<Value>> {
    check_filters(call, filters, ctx.version())?;
    let allowed = field_groups.concat();
    let body = call.body(&allowed, ctx.version())?;
    ctx.put(
        &format!(
            "{}/{}{}",
            base,
            call.target()?,
            call.query().to_query_string()
        ),
        wrap("quota_set", body),
    )
}

fn update_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(ctx, call, LEGACY_PATH, &["user_id"], &[BASE_FIELDS])
}

fn update_v2_7(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(ctx, call, PATH, &["user_id"], &[BASE_FIELDS])
}

fn update_v2_39(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(ctx, call, PATH, &["user_id", "share_type"], &[BASE_FIELDS])
}

fn update_v2_40(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(
        ctx,
        call,
        PATH,
        &["user_id", "share_type"],
        &[BASE_FIELDS, GROUP_FIELDS],
    )
}

fn update_v2_53(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(
        ctx,
        call,
        PATH,
        &["user_id", "share_type"],
        &[BASE_FIELDS, GROUP_FIELDS, REPLICA_FIELDS],
    )
}

fn update_v2_62(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    update_with(
        ctx,
        call,
        PATH,
        &["user_id", "share_type"],
        &[BASE_FIELDS, GROUP_FIELDS, REPLICA_FIELDS, PER_SHARE_FIELDS],
    )
}

fn delete_with(
    ctx: &CallContext<'_>,
    call: &Call,
    base: &str,
    filters: &[&str],
) -> Result<Option<Value>> {
    check_filters(call, filters, ctx.version())?;
    ctx.delete(&format!(
        "{}/{}{}",
        base,
        call.target()?,
        call.query().to_query_string()
    ))
}

fn delete_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_with(ctx, call, LEGACY_PATH, &["user_id"])
}

fn delete_v2_7(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_with(ctx, call, PATH, &["user_id"])
}

fn delete_v2_39(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_with(ctx, call, PATH, &["user_id", "share_type"])
}
