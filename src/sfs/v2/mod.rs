//! # Version 2 API Managers
//!
//! One module per resource type. Each module has two halves:
//!
//! - a manager (`Shares`, `Quotas`, ...) with typed methods that validate their
//!   arguments, build a [`Call`] and hand it to [`Client::invoke`];
//! - the versioned handlers, registered from the module's `register` function,
//!   that turn a `Call` into the request shape of their version range.
//!
//! Managers never branch on the API version themselves. When a request shape
//! changes at some microversion, the module registers another handler for the
//! new range and the registry picks between them.

use crate::client::{Call, CallContext, Client, Handler};
use crate::dispatch::{Registry, RegistryBuilder};
use crate::error::{Result, SfsError};
use crate::resource::Resource;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod availability_zones;
pub mod quotas;
pub mod resource_locks;
pub mod services;
pub mod share_replicas;
pub mod share_servers;
pub mod share_types;
pub mod shares;
pub mod snapshots;

/// The registration pass: every versioned operation this client knows.
pub fn registry() -> Result<Registry<Handler>> {
    let mut builder = Registry::builder();
    shares::register(&mut builder)?;
    snapshots::register(&mut builder)?;
    share_servers::register(&mut builder)?;
    share_replicas::register(&mut builder)?;
    quotas::register(&mut builder)?;
    resource_locks::register(&mut builder)?;
    share_types::register(&mut builder)?;
    availability_zones::register(&mut builder)?;
    services::register(&mut builder)?;
    Ok(builder.build())
}

pub(crate) type Builder = RegistryBuilder<Handler>;

/// Runs `operation` and unwraps a single resource from the response.
pub(crate) fn fetch_one(
    client: &Client,
    operation: &str,
    call: &Call,
    kind: &'static str,
    key: &str,
) -> Result<Resource> {
    let body = client.invoke(operation, call)?;
    let resource = Resource::from_body(kind, body, key)?;
    client.remember(std::slice::from_ref(&resource));
    Ok(resource)
}

/// Runs `operation` and unwraps a resource list from the response.
pub(crate) fn fetch_list(
    client: &Client,
    operation: &str,
    call: &Call,
    kind: &'static str,
    key: &str,
) -> Result<Vec<Resource>> {
    let body = client.invoke(operation, call)?;
    let resources = Resource::list_from_body(kind, body, key)?;
    client.remember(&resources);
    Ok(resources)
}

/// A body that is the object itself rather than `{"<key>": {...}}`.
pub(crate) fn bare(kind: &'static str, body: Option<Value>) -> Result<Resource> {
    match body {
        Some(Value::Object(info)) => Ok(Resource::new(kind, info)),
        None => Ok(Resource::new(kind, Map::new())),
        Some(other) => Err(SfsError::CommandError(format!(
            "Unexpected {} response: {}",
            kind, other
        ))),
    }
}

pub(crate) fn string_map(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Handler shared by the plain "GET one path" shapes: `<path>` + target.
pub(crate) fn get_at(
    ctx: &CallContext<'_>,
    collection: &str,
    call: &Call,
) -> Result<Option<Value>> {
    ctx.get(&format!("{}/{}", collection, call.target()?))
}

pub(crate) fn delete_at(
    ctx: &CallContext<'_>,
    collection: &str,
    call: &Call,
) -> Result<Option<Value>> {
    ctx.delete(&format!("{}/{}", collection, call.target()?))
}

pub(crate) fn list_at(ctx: &CallContext<'_>, path: &str, call: &Call) -> Result<Option<Value>> {
    ctx.get(&format!("{}{}", path, call.query().to_query_string()))
}

/// Fails when `value` is not one of `allowed`.
pub(crate) fn check_choice(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(SfsError::InvalidArgument(format!(
            "{} must be one of: {} (got '{}')",
            field,
            allowed.join(", "),
            value
        )))
    }
}

pub(crate) fn check_positive(field: &str, value: i64) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(SfsError::InvalidArgument(format!(
            "{} must be a positive integer (got {})",
            field, value
        )))
    }
}

/// The service's reset-state vocabulary shared by shares, snapshots,
/// replicas and servers.
pub const RESOURCE_STATES: &[&str] = &[
    "available",
    "error",
    "creating",
    "deleting",
    "error_deleting",
    "migrating",
    "migrating_to",
    "extending",
    "extending_error",
    "shrinking",
    "shrinking_error",
    "shrinking_possible_data_loss_error",
    "inactive",
    "manage_starting",
    "manage_error",
    "unmanage_starting",
    "unmanage_error",
    "restoring",
    "reverting",
    "reverting_error",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{ApiVersion, MAX_API_VERSION, MIN_API_VERSION};

    #[test]
    fn registration_pass_succeeds_without_overlaps() {
        let registry = registry().unwrap();
        assert!(registry.contains("shares.create"));
        assert!(registry.contains("quotas.get"));
        assert!(registry.contains("resource_locks.create"));
    }

    #[test]
    fn core_operations_cover_the_whole_client_range() {
        let registry = registry().unwrap();
        for op in ["shares.create", "shares.get", "shares.list", "quotas.get", "share_types.list"] {
            for minor in MIN_API_VERSION.minor()..=MAX_API_VERSION.minor() {
                let version = ApiVersion::new(2, minor);
                assert!(registry.resolve(op, version).is_ok(), "{op} at {version}");
            }
        }
    }

    #[test]
    fn choices_are_validated() {
        assert!(check_choice("access_type", "ip", &["ip", "user"]).is_ok());
        let err = check_choice("access_type", "dns", &["ip", "user"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: access_type must be one of: ip, user (got 'dns')"
        );
        assert!(check_positive("size", 0).is_err());
    }
}
