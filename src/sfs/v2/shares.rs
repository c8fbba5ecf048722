//! Shares: CRUD, size changes, access rules, metadata and migration.
//!
//! Version boundaries handled here:
//!
//! - `2.7` drops the `os-` prefix from every share action.
//! - create accepts `share_group_id` from `2.31`, `scheduler_hints` from
//!   `2.65` and `mount_point_name` from `2.84`.
//! - access rules accept IPv6 addresses from `2.38` and carry metadata from
//!   `2.45`, where listing moves to `/share-access-rules`.
//! - extend accepts `force` from `2.64`.
//! - migration (`2.22+`) is experimental; `2.29` adds `preserve_snapshots`.

use super::{
    bare, check_choice, check_positive, delete_at, fetch_list, fetch_one, get_at, list_at,
    string_map, Builder, RESOURCE_STATES,
};
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::find::Lookup;
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use cidr::IpInet;

pub const PROTOCOLS: &[&str] = &["NFS", "CIFS", "GLUSTERFS", "HDFS", "CEPHFS", "MAPRFS"];
pub const ACCESS_TYPES: &[&str] = &["ip", "user", "cert", "cephx"];
pub const ACCESS_LEVELS: &[&str] = &["rw", "ro"];

const BASE_CREATE_FIELDS: &[&str] = &[
    "share_proto",
    "size",
    "name",
    "description",
    "snapshot_id",
    "share_network_id",
    "share_type",
    "availability_zone",
    "is_public",
    "metadata",
];

#[derive(Debug, Clone, Default)]
pub struct ShareCreate {
    pub share_proto: String,
    pub size: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub snapshot_id: Option<String>,
    pub share_network_id: Option<String>,
    pub share_type: Option<String>,
    pub availability_zone: Option<String>,
    pub is_public: bool,
    pub metadata: BTreeMap<String, String>,
    pub share_group_id: Option<String>,
    pub scheduler_hints: BTreeMap<String, String>,
    pub mount_point_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShareUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub access_type: String,
    pub access_to: String,
    pub access_level: String,
    pub metadata: BTreeMap<String, String>,
}

impl AccessRule {
    pub fn new(access_type: impl Into<String>, access_to: impl Into<String>) -> Self {
        Self {
            access_type: access_type.into(),
            access_to: access_to.into(),
            access_level: "rw".to_string(),
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MigrationRequest {
    pub host: String,
    pub force_host_assisted_migration: bool,
    pub preserve_metadata: bool,
    pub preserve_snapshots: bool,
    pub writable: bool,
    pub nondisruptive: bool,
    pub new_share_network_id: Option<String>,
    pub new_share_type_id: Option<String>,
}

pub struct Shares<'c> {
    client: &'c Client,
}

impl<'c> Shares<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn create(&self, request: &ShareCreate) -> Result<Resource> {
        let proto = request.share_proto.to_ascii_uppercase();
        check_choice("share_proto", &proto, PROTOCOLS)?;
        check_positive("size", request.size)?;

        let mut call = Call::new()
            .param("share_proto", proto)
            .param("size", request.size)
            .param("is_public", request.is_public)
            .param_opt("name", request.name.as_deref())
            .param_opt("description", request.description.as_deref())
            .param_opt("snapshot_id", request.snapshot_id.as_deref())
            .param_opt("share_network_id", request.share_network_id.as_deref())
            .param_opt("share_type", request.share_type.as_deref())
            .param_opt("availability_zone", request.availability_zone.as_deref())
            .param_opt("share_group_id", request.share_group_id.as_deref())
            .param_opt("mount_point_name", request.mount_point_name.as_deref());
        if !request.metadata.is_empty() {
            call = call.param("metadata", string_map(&request.metadata));
        }
        if !request.scheduler_hints.is_empty() {
            call = call.param("scheduler_hints", string_map(&request.scheduler_hints));
        }
        fetch_one(self.client, "shares.create", &call, "share", "share")
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(self.client, "shares.get", &Call::on(id), "share", "share")
    }

    pub fn list(&self, filters: QueryFilters) -> Result<Vec<Resource>> {
        let call = Call::new().filters(filters);
        fetch_list(self.client, "shares.list", &call, "share", "shares")
    }

    pub fn update(&self, id: &str, update: &ShareUpdate) -> Result<Resource> {
        let call = Call::on(id)
            .param_opt("display_name", update.name.as_deref())
            .param_opt("display_description", update.description.as_deref())
            .param_opt("is_public", update.is_public);
        if call.params().is_empty() {
            return Err(SfsError::InvalidArgument(
                "at least one of name, description or is_public must be given".to_string(),
            ));
        }
        fetch_one(self.client, "shares.update", &call, "share", "share")
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("shares.delete", &Call::on(id))?;
        Ok(())
    }

    pub fn force_delete(&self, id: &str) -> Result<()> {
        self.client.invoke("shares.force_delete", &Call::on(id))?;
        Ok(())
    }

    pub fn extend(&self, id: &str, new_size: i64, force: bool) -> Result<()> {
        check_positive("new_size", new_size)?;
        let call = Call::on(id)
            .param("new_size", new_size)
            .param_opt("force", force.then_some(true));
        self.client.invoke("shares.extend", &call)?;
        Ok(())
    }

    pub fn shrink(&self, id: &str, new_size: i64) -> Result<()> {
        check_positive("new_size", new_size)?;
        let call = Call::on(id).param("new_size", new_size);
        self.client.invoke("shares.shrink", &call)?;
        Ok(())
    }

    pub fn reset_state(&self, id: &str, state: &str) -> Result<()> {
        check_choice("state", state, RESOURCE_STATES)?;
        let call = Call::on(id).param("status", state);
        self.client.invoke("shares.reset_state", &call)?;
        Ok(())
    }

    pub fn allow(&self, id: &str, rule: &AccessRule) -> Result<Resource> {
        check_choice("access_type", &rule.access_type, ACCESS_TYPES)?;
        check_choice("access_level", &rule.access_level, ACCESS_LEVELS)?;
        if rule.access_type == "ip" {
            validate_ip_rule(&rule.access_to)?;
        } else if rule.access_to.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "access_to must not be empty".to_string(),
            ));
        }

        let mut call = Call::on(id)
            .param("access_type", rule.access_type.as_str())
            .param("access_to", rule.access_to.as_str())
            .param("access_level", rule.access_level.as_str());
        if !rule.metadata.is_empty() {
            call = call.param("metadata", string_map(&rule.metadata));
        }
        fetch_one(self.client, "shares.allow_access", &call, "access_rule", "access")
    }

    pub fn deny(&self, id: &str, access_id: &str) -> Result<()> {
        let call = Call::on(id).param("access_id", access_id);
        self.client.invoke("shares.deny_access", &call)?;
        Ok(())
    }

    pub fn access_list(&self, id: &str) -> Result<Vec<Resource>> {
        fetch_list(
            self.client,
            "shares.access_list",
            &Call::on(id),
            "access_rule",
            "access_list",
        )
    }

    pub fn get_metadata(&self, id: &str) -> Result<Map<String, Value>> {
        let body = self.client.invoke("shares.metadata_get", &Call::on(id))?;
        Ok(Resource::from_body("metadata", body, "metadata")?.into_attributes())
    }

    pub fn set_metadata(
        &self,
        id: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<Map<String, Value>> {
        if metadata.is_empty() {
            return Err(SfsError::InvalidArgument(
                "at least one metadata key=value pair is required".to_string(),
            ));
        }
        let call = Call::on(id).param("metadata", string_map(metadata));
        let body = self.client.invoke("shares.metadata_set", &call)?;
        Ok(Resource::from_body("metadata", body, "metadata")?.into_attributes())
    }

    pub fn unset_metadata(&self, id: &str, keys: &[String]) -> Result<()> {
        for key in keys {
            let call = Call::on(id).param("key", key.as_str());
            self.client.invoke("shares.metadata_unset", &call)?;
        }
        Ok(())
    }

    pub fn migration_start(&self, id: &str, request: &MigrationRequest) -> Result<()> {
        if request.host.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a destination host is required".to_string(),
            ));
        }
        let call = Call::on(id)
            .param("host", request.host.as_str())
            .param(
                "force_host_assisted_migration",
                request.force_host_assisted_migration,
            )
            .param("preserve_metadata", request.preserve_metadata)
            .param("writable", request.writable)
            .param("nondisruptive", request.nondisruptive)
            .param("preserve_snapshots", request.preserve_snapshots)
            .param_opt("new_share_network_id", request.new_share_network_id.as_deref())
            .param_opt("new_share_type_id", request.new_share_type_id.as_deref());
        self.client.invoke("shares.migration_start", &call)?;
        Ok(())
    }

    pub fn migration_complete(&self, id: &str) -> Result<()> {
        self.client.invoke("shares.migration_complete", &Call::on(id))?;
        Ok(())
    }

    pub fn migration_cancel(&self, id: &str) -> Result<()> {
        self.client.invoke("shares.migration_cancel", &Call::on(id))?;
        Ok(())
    }

    pub fn migration_get_progress(&self, id: &str) -> Result<Resource> {
        let body = self
            .client
            .invoke("shares.migration_get_progress", &Call::on(id))?;
        bare("migration_progress", body)
    }
}

impl Lookup for Shares<'_> {
    fn kind(&self) -> &'static str {
        "share"
    }

    fn get(&self, id: &str) -> Result<Resource> {
        Shares::get(self, id)
    }

    fn list_by_name(&self, name: &str) -> Result<Vec<Resource>> {
        self.list(QueryFilters::new().with("name", name))
    }
}

/// Parses a bare address or `address/prefix`, IPv4 or IPv6.
fn parse_ip_rule(access_to: &str) -> Result<IpInet> {
    let invalid =
        || SfsError::InvalidArgument(format!("'{}' is not a valid IP address", access_to));
    // Integer parsing would let `+8` through as a prefix length.
    if let Some((_, prefix)) = access_to.split_once('/') {
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
    }
    access_to.parse::<IpInet>().map_err(|_| invalid())
}

fn validate_ip_rule(access_to: &str) -> Result<()> {
    parse_ip_rule(access_to).map(|_| ())
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("shares.create", "2.0", Some("2.30"), create_v2_0)?
        .register("shares.create", "2.31", Some("2.64"), create_v2_31)?
        .register("shares.create", "2.65", Some("2.83"), create_v2_65)?
        .register("shares.create", "2.84", None, create_v2_84)?
        .register("shares.get", "2.0", None, get)?
        .register("shares.list", "2.0", None, list)?
        .register("shares.update", "2.0", None, update)?
        .register("shares.delete", "2.0", None, delete)?
        .register("shares.force_delete", "2.0", Some("2.6"), force_delete_legacy)?
        .register("shares.force_delete", "2.7", None, force_delete)?
        .register("shares.extend", "2.0", Some("2.6"), extend_legacy)?
        .register("shares.extend", "2.7", Some("2.63"), extend)?
        .register("shares.extend", "2.64", None, extend_v2_64)?
        .register("shares.shrink", "2.0", Some("2.6"), shrink_legacy)?
        .register("shares.shrink", "2.7", None, shrink)?
        .register("shares.reset_state", "2.0", Some("2.6"), reset_state_legacy)?
        .register("shares.reset_state", "2.7", None, reset_state)?
        .register("shares.allow_access", "2.0", Some("2.6"), allow_legacy)?
        .register("shares.allow_access", "2.7", Some("2.37"), allow_v2_7)?
        .register("shares.allow_access", "2.38", Some("2.44"), allow_v2_38)?
        .register("shares.allow_access", "2.45", None, allow_v2_45)?
        .register("shares.deny_access", "2.0", Some("2.6"), deny_legacy)?
        .register("shares.deny_access", "2.7", None, deny)?
        .register("shares.access_list", "2.0", Some("2.6"), access_list_legacy)?
        .register("shares.access_list", "2.7", Some("2.44"), access_list_action)?
        .register("shares.access_list", "2.45", None, access_list_rules)?
        .register("shares.metadata_get", "2.0", None, metadata_get)?
        .register("shares.metadata_set", "2.0", None, metadata_set)?
        .register("shares.metadata_unset", "2.0", None, metadata_unset)?
        .register_experimental(
            "shares.migration_start",
            "2.22",
            Some("2.28"),
            migration_start_v2_22,
        )?
        .register_experimental("shares.migration_start", "2.29", None, migration_start_v2_29)?
        .register_experimental("shares.migration_complete", "2.22", None, migration_complete)?
        .register_experimental("shares.migration_cancel", "2.22", None, migration_cancel)?
        .register_experimental(
            "shares.migration_get_progress",
            "2.22",
            None,
            migration_get_progress,
        )?;
    Ok(())
}

fn create_with(ctx: &CallContext<'_>, call: &Call, extra: &[&str]) -> Result<Option<Value>> {
    let allowed: Vec<&str> = BASE_CREATE_FIELDS.iter().chain(extra).copied().collect();
    let body = call.body(&allowed, ctx.version())?;
    ctx.post("/shares", wrap("share", body))
}

fn create_v2_0(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(ctx, call, &[])
}

fn create_v2_31(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(ctx, call, &["share_group_id"])
}

fn create_v2_65(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(ctx, call, &["share_group_id", "scheduler_hints"])
}

fn create_v2_84(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(
        ctx,
        call,
        &["share_group_id", "scheduler_hints", "mount_point_name"],
    )
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, "/shares", call)
}

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    list_at(ctx, "/shares/detail", call)
}

fn update(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(
        &["display_name", "display_description", "is_public"],
        ctx.version(),
    )?;
    ctx.put(&format!("/shares/{}", call.target()?), wrap("share", body))
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, "/shares", call)
}

fn share_action(
    ctx: &CallContext<'_>,
    call: &Call,
    action: &str,
    params: Value,
) -> Result<Option<Value>> {
    ctx.action("/shares", call.target()?, action, params)
}

fn force_delete_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "os-force_delete", Value::Null)
}

fn force_delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "force_delete", Value::Null)
}

fn extend_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["new_size"], ctx.version())?;
    share_action(ctx, call, "os-extend", body)
}

fn extend(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["new_size"], ctx.version())?;
    share_action(ctx, call, "extend", body)
}

fn extend_v2_64(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["new_size", "force"], ctx.version())?;
    share_action(ctx, call, "extend", body)
}

fn shrink_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["new_size"], ctx.version())?;
    share_action(ctx, call, "os-shrink", body)
}

fn shrink(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["new_size"], ctx.version())?;
    share_action(ctx, call, "shrink", body)
}

fn reset_state_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["status"], ctx.version())?;
    share_action(ctx, call, "os-reset_status", body)
}

fn reset_state(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["status"], ctx.version())?;
    share_action(ctx, call, "reset_status", body)
}

const ACCESS_FIELDS: &[&str] = &["access_type", "access_to", "access_level"];

fn reject_ipv6(ctx: &CallContext<'_>, call: &Call) -> Result<()> {
    let is_ip = call.get("access_type").and_then(Value::as_str) == Some("ip");
    let to = call.get("access_to").and_then(Value::as_str).unwrap_or_default();
    if is_ip && matches!(parse_ip_rule(to), Ok(IpInet::V6(_))) {
        return Err(SfsError::InvalidArgument(format!(
            "IPv6 access rules require API version 2.38 or later (negotiated {})",
            ctx.version()
        )));
    }
    Ok(())
}

fn allow_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    reject_ipv6(ctx, call)?;
    let body = call.body(ACCESS_FIELDS, ctx.version())?;
    share_action(ctx, call, "os-allow_access", body)
}

fn allow_v2_7(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    reject_ipv6(ctx, call)?;
    let body = call.body(ACCESS_FIELDS, ctx.version())?;
    share_action(ctx, call, "allow_access", body)
}

fn allow_v2_38(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(ACCESS_FIELDS, ctx.version())?;
    share_action(ctx, call, "allow_access", body)
}

fn allow_v2_45(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["access_type", "access_to", "access_level", "metadata"], ctx.version())?;
    share_action(ctx, call, "allow_access", body)
}

fn deny_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["access_id"], ctx.version())?;
    share_action(ctx, call, "os-deny_access", body)
}

fn deny(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["access_id"], ctx.version())?;
    share_action(ctx, call, "deny_access", body)
}

fn access_list_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "os-access_list", Value::Null)
}

fn access_list_action(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "access_list", Value::Null)
}

fn access_list_rules(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let query = QueryFilters::new().with("share_id", call.target()?);
    ctx.get(&format!("/share-access-rules{}", query.to_query_string()))
}

fn metadata_get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.get(&format!("/shares/{}/metadata", call.target()?))
}

fn metadata_set(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["metadata"], ctx.version())?;
    ctx.post(&format!("/shares/{}/metadata", call.target()?), body)
}

fn metadata_unset(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let key = call
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| SfsError::InvalidArgument("a metadata key is required".to_string()))?;
    ctx.delete(&format!("/shares/{}/metadata/{}", call.target()?, key))
}

const MIGRATION_FIELDS: &[&str] = &[
    "host",
    "force_host_assisted_migration",
    "preserve_metadata",
    "writable",
    "nondisruptive",
    "new_share_network_id",
    "new_share_type_id",
    "preserve_snapshots",
];

fn migration_start_v2_22(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    // preserve_snapshots arrived in 2.29; an unset flag is simply not sent.
    let mut body = call.body(MIGRATION_FIELDS, ctx.version())?;
    if let Value::Object(map) = &mut body {
        if map.remove("preserve_snapshots") == Some(Value::Bool(true)) {
            return Err(SfsError::InvalidArgument(format!(
                "'preserve_snapshots' is not supported at API version {}",
                ctx.version()
            )));
        }
    }
    share_action(ctx, call, "migration_start", body)
}

fn migration_start_v2_29(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(MIGRATION_FIELDS, ctx.version())?;
    share_action(ctx, call, "migration_start", body)
}

fn migration_complete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "migration_complete", Value::Null)
}

fn migration_cancel(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "migration_cancel", Value::Null)
}

fn migration_get_progress(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    share_action(ctx, call, "migration_get_progress", Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EXPERIMENTAL_HEADER;
    use crate::transport::memory::fixtures::{client_at, path_of};
    use crate::transport::Method;
    use serde_json::json;

    fn share_body(id: &str) -> Value {
        json!({"share": {"id": id, "name": "web", "status": "creating", "size": 1}})
    }

    fn nfs(size: i64) -> ShareCreate {
        ShareCreate {
            share_proto: "nfs".into(),
            size,
            ..ShareCreate::default()
        }
    }

    #[test]
    fn create_posts_wrapped_body() {
        let (client, transport) = client_at("2.30");
        transport.respond_json(202, share_body("s1"));

        let share = client
            .shares()
            .create(&ShareCreate {
                name: Some("web".into()),
                ..nfs(1)
            })
            .unwrap();
        assert_eq!(share.id(), Some("s1"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(path_of(&request), "/shares");
        assert_eq!(
            request.body,
            Some(json!({"share": {"share_proto": "NFS", "size": 1, "name": "web", "is_public": false}}))
        );
    }

    #[test]
    fn create_fields_are_gated_by_version() {
        let (client, transport) = client_at("2.30");
        let request = ShareCreate {
            share_group_id: Some("g1".into()),
            ..nfs(1)
        };
        let err = client.shares().create(&request).unwrap_err();
        assert!(matches!(err, SfsError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);

        let (client, transport) = client_at("2.31");
        transport.respond_json(202, share_body("s1"));
        client.shares().create(&request).unwrap();
        let body = transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["share"]["share_group_id"], "g1");

        let (client, _) = client_at("2.83");
        let with_mount = ShareCreate {
            mount_point_name: Some("mp".into()),
            ..nfs(1)
        };
        assert!(client.shares().create(&with_mount).is_err());
    }

    #[test]
    fn create_validates_arguments_before_sending() {
        let (client, transport) = client_at("2.84");
        assert!(client.shares().create(&nfs(0)).is_err());
        let bad_proto = ShareCreate {
            share_proto: "FTP".into(),
            ..nfs(1)
        };
        assert!(client.shares().create(&bad_proto).is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn list_uses_detail_path_with_sorted_filters() {
        let (client, transport) = client_at("2.65");
        transport.respond_json(200, json!({"shares": [{"id": "a"}, {"id": "b"}]}));
        let filters = QueryFilters::new().with("status", "available").with("name", "web");
        let shares = client.shares().list(filters).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(
            path_of(&transport.last_request().unwrap()),
            "/shares/detail?name=web&status=available"
        );
    }

    #[test]
    fn actions_drop_the_os_prefix_at_2_7() {
        let (client, transport) = client_at("2.6");
        transport.respond_empty(202);
        client.shares().force_delete("s1").unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(path_of(&request), "/shares/s1/action");
        assert_eq!(request.body, Some(json!({"os-force_delete": null})));

        let (client, transport) = client_at("2.7");
        transport.respond_empty(202);
        client.shares().force_delete("s1").unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.body, Some(json!({"force_delete": null})));
    }

    #[test]
    fn extend_force_requires_2_64() {
        let (client, transport) = client_at("2.63");
        assert!(client.shares().extend("s1", 10, true).is_err());
        assert_eq!(transport.request_count(), 0);

        transport.respond_empty(202);
        client.shares().extend("s1", 10, false).unwrap();
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"extend": {"new_size": 10}}))
        );

        let (client, transport) = client_at("2.64");
        transport.respond_empty(202);
        client.shares().extend("s1", 10, true).unwrap();
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"extend": {"new_size": 10, "force": true}}))
        );
    }

    #[test]
    fn reset_state_validates_state_and_uses_versioned_action() {
        let (client, transport) = client_at("2.3");
        assert!(client.shares().reset_state("s1", "bogus").is_err());
        transport.respond_empty(202);
        client.shares().reset_state("s1", "error").unwrap();
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"os-reset_status": {"status": "error"}}))
        );
    }

    #[test]
    fn access_rules_validate_type_and_address() {
        let (client, transport) = client_at("2.50");
        assert!(client.shares().allow("s1", &AccessRule::new("dns", "x")).is_err());
        assert!(client
            .shares()
            .allow("s1", &AccessRule::new("ip", "10.0.0.300"))
            .is_err());
        assert!(client
            .shares()
            .allow("s1", &AccessRule::new("ip", "10.0.0.0/33"))
            .is_err());
        assert_eq!(transport.request_count(), 0);

        transport.respond_json(200, json!({"access": {"id": "r1", "state": "queued_to_apply"}}));
        let rule = client
            .shares()
            .allow("s1", &AccessRule::new("ip", "10.0.0.0/24"))
            .unwrap();
        assert_eq!(rule.id(), Some("r1"));
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"allow_access": {"access_type": "ip", "access_to": "10.0.0.0/24", "access_level": "rw"}}))
        );
    }

    #[test]
    fn ip_rules_need_a_well_formed_prefix() {
        assert!(validate_ip_rule("10.0.0.1").is_ok());
        assert!(validate_ip_rule("10.0.0.0/8").is_ok());
        assert!(validate_ip_rule("fd00::1").is_ok());
        assert!(validate_ip_rule("fd00::/64").is_ok());
        assert!(validate_ip_rule("10.0.0.0/+8").is_err());
        assert!(validate_ip_rule("10.0.0.0/").is_err());
        assert!(validate_ip_rule("10.0.0.0/8/8").is_err());
        assert!(validate_ip_rule("fd00::/129").is_err());
        assert!(validate_ip_rule("host.example").is_err());
    }

    #[test]
    fn malformed_prefix_never_reaches_the_wire() {
        let (client, transport) = client_at("2.50");
        let err = client
            .shares()
            .allow("s1", &AccessRule::new("ip", "10.0.0.0/+8"))
            .unwrap_err();
        assert!(matches!(err, SfsError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn ipv6_rules_need_2_38() {
        let (client, transport) = client_at("2.37");
        let rule = AccessRule::new("ip", "fd00::/64");
        let err = client.shares().allow("s1", &rule).unwrap_err();
        assert!(err.to_string().contains("2.38"));
        assert_eq!(transport.request_count(), 0);

        let (client, transport) = client_at("2.38");
        transport.respond_json(200, json!({"access": {"id": "r2"}}));
        client.shares().allow("s1", &rule).unwrap();
    }

    #[test]
    fn access_rule_metadata_needs_2_45() {
        let mut rule = AccessRule::new("user", "alice");
        rule.metadata.insert("team".into(), "storage".into());

        let (client, _) = client_at("2.44");
        assert!(client.shares().allow("s1", &rule).is_err());

        let (client, transport) = client_at("2.45");
        transport.respond_json(200, json!({"access": {"id": "r3"}}));
        client.shares().allow("s1", &rule).unwrap();
        let body = transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["allow_access"]["metadata"], json!({"team": "storage"}));
    }

    #[test]
    fn access_list_moves_to_rules_endpoint_at_2_45() {
        let (client, transport) = client_at("2.44");
        transport.respond_json(200, json!({"access_list": [{"id": "r1"}]}));
        client.shares().access_list("s1").unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(json!({"access_list": null})));

        let (client, transport) = client_at("2.45");
        transport.respond_json(200, json!({"access_list": [{"id": "r1"}, {"id": "r2"}]}));
        let rules = client.shares().access_list("s1").unwrap();
        assert_eq!(rules.len(), 2);
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(path_of(&request), "/share-access-rules?share_id=s1");
    }

    #[test]
    fn metadata_round_trip_paths() {
        let (client, transport) = client_at("2.40");
        transport.respond_json(200, json!({"metadata": {"a": "1"}}));
        let mut metadata = BTreeMap::new();
        metadata.insert("a".to_string(), "1".to_string());
        let result = client.shares().set_metadata("s1", &metadata).unwrap();
        assert_eq!(result.get("a"), Some(&json!("1")));
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"metadata": {"a": "1"}}))
        );

        transport.respond_empty(200).respond_empty(200);
        client
            .shares()
            .unset_metadata("s1", &["a".to_string(), "b".to_string()])
            .unwrap();
        let requests = transport.requests();
        assert_eq!(path_of(&requests[1]), "/shares/s1/metadata/a");
        assert_eq!(path_of(&requests[2]), "/shares/s1/metadata/b");
        assert_eq!(requests[2].method, Method::Delete);
    }

    #[test]
    fn migration_is_experimental_and_gated() {
        let (client, transport) = client_at("2.21");
        let request = MigrationRequest {
            host: "host@backend#pool".into(),
            ..MigrationRequest::default()
        };
        assert!(matches!(
            client.shares().migration_start("s1", &request),
            Err(SfsError::UnsupportedVersion { .. })
        ));
        assert_eq!(transport.request_count(), 0);

        let (client, transport) = client_at("2.22");
        let snapshots = MigrationRequest {
            preserve_snapshots: true,
            ..request.clone()
        };
        assert!(client.shares().migration_start("s1", &snapshots).is_err());
        transport.respond_empty(202);
        client.shares().migration_start("s1", &request).unwrap();
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.header(EXPERIMENTAL_HEADER), Some("True"));
        assert!(sent.body.unwrap()["migration_start"]
            .get("preserve_snapshots")
            .is_none());

        let (client, transport) = client_at("2.29");
        transport.respond_empty(202);
        client.shares().migration_start("s1", &snapshots).unwrap();
        let body = transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["migration_start"]["preserve_snapshots"], true);
    }

    #[test]
    fn migration_progress_reads_bare_body() {
        let (client, transport) = client_at("2.59");
        transport.respond_json(200, json!({"total_progress": 42, "task_state": "data_copying_in_progress"}));
        let progress = client.shares().migration_get_progress("s1").unwrap();
        assert_eq!(progress.get("total_progress"), Some(&json!(42)));
    }

    #[test]
    fn update_requires_a_field() {
        let (client, transport) = client_at("2.10");
        assert!(client.shares().update("s1", &ShareUpdate::default()).is_err());
        transport.respond_json(200, share_body("s1"));
        client
            .shares()
            .update(
                "s1",
                &ShareUpdate {
                    name: Some("renamed".into()),
                    ..ShareUpdate::default()
                },
            )
            .unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.body, Some(json!({"share": {"display_name": "renamed"}})));
    }
}
