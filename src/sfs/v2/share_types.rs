//! Share types and their extra specs.
//!
//! The public/private flag travels as `os-share-type-access:is_public` up to
//! `2.6` and as `share_type_access:is_public` afterwards. `description` is
//! accepted from `2.41`.

use super::{delete_at, fetch_list, fetch_one, get_at, string_map, Builder};
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::find::Lookup;
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const DHSS: &str = "driver_handles_share_servers";

#[derive(Debug, Clone, Default)]
pub struct ShareTypeCreate {
    pub name: String,
    pub driver_handles_share_servers: bool,
    pub is_public: bool,
    pub description: Option<String>,
    pub extra_specs: BTreeMap<String, String>,
}

pub struct ShareTypes<'c> {
    client: &'c Client,
}

impl<'c> ShareTypes<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Public types, plus private ones when `show_all` is set.
    pub fn list(&self, show_all: bool) -> Result<Vec<Resource>> {
        let filters = QueryFilters::new().with_opt("is_public", show_all.then_some("all"));
        let call = Call::new().filters(filters);
        fetch_list(self.client, "share_types.list", &call, "share_type", "share_types")
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(
            self.client,
            "share_types.get",
            &Call::on(id),
            "share_type",
            "share_type",
        )
    }

    pub fn create(&self, request: &ShareTypeCreate) -> Result<Resource> {
        if request.name.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a share type name is required".to_string(),
            ));
        }
        if request.extra_specs.contains_key(DHSS) {
            return Err(SfsError::InvalidArgument(format!(
                "{} is set through its own argument, not as an extra spec",
                DHSS
            )));
        }
        let mut specs = request.extra_specs.clone();
        specs.insert(
            DHSS.to_string(),
            request.driver_handles_share_servers.to_string(),
        );
        let call = Call::new()
            .param("name", request.name.as_str())
            .param("is_public", request.is_public)
            .param("extra_specs", string_map(&specs))
            .param_opt("description", request.description.as_deref());
        fetch_one(
            self.client,
            "share_types.create",
            &call,
            "share_type",
            "share_type",
        )
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("share_types.delete", &Call::on(id))?;
        Ok(())
    }

    pub fn set_keys(
        &self,
        id: &str,
        specs: &BTreeMap<String, String>,
    ) -> Result<Map<String, Value>> {
        if specs.is_empty() {
            return Err(SfsError::InvalidArgument(
                "at least one extra spec is required".to_string(),
            ));
        }
        let call = Call::on(id).param("extra_specs", string_map(specs));
        let body = self.client.invoke("share_types.set_keys", &call)?;
        Ok(Resource::from_body("extra_specs", body, "extra_specs")?.into_attributes())
    }

    pub fn unset_keys(&self, id: &str, keys: &[String]) -> Result<()> {
        for key in keys {
            let call = Call::on(id).param("key", key.as_str());
            self.client.invoke("share_types.unset_keys", &call)?;
        }
        Ok(())
    }
}

impl Lookup for ShareTypes<'_> {
    fn kind(&self) -> &'static str {
        "share type"
    }

    fn get(&self, id: &str) -> Result<Resource> {
        ShareTypes::get(self, id)
    }

    fn list_by_name(&self, name: &str) -> Result<Vec<Resource>> {
        Ok(self
            .list(true)?
            .into_iter()
            .filter(|share_type| share_type.name() == Some(name))
            .collect())
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("share_types.list", "2.0", None, list)?
        .register("share_types.get", "2.0", None, get)?
        .register("share_types.create", "2.0", Some("2.6"), create_legacy)?
        .register("share_types.create", "2.7", Some("2.40"), create_v2_7)?
        .register("share_types.create", "2.41", None, create_v2_41)?
        .register("share_types.delete", "2.0", None, delete)?
        .register("share_types.set_keys", "2.0", None, set_keys)?
        .register("share_types.unset_keys", "2.0", None, unset_keys)?;
    Ok(())
}

const COLLECTION: &str = "/types";

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    super::list_at(ctx, COLLECTION, call)
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, COLLECTION, call)
}

/// Renames the generic `is_public` parameter to the version's wire key.
fn create_with(
    ctx: &CallContext<'_>,
    call: &Call,
    public_key: &str,
    allowed: &[&str],
) -> Result<Option<Value>> {
    let mut body = call.body(allowed, ctx.version())?;
    if let Value::Object(map) = &mut body {
        if let Some(is_public) = map.remove("is_public") {
            map.insert(public_key.to_string(), is_public);
        }
    }
    ctx.post(COLLECTION, wrap("share_type", body))
}

fn create_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(
        ctx,
        call,
        "os-share-type-access:is_public",
        &["name", "is_public", "extra_specs"],
    )
}

fn create_v2_7(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(
        ctx,
        call,
        "share_type_access:is_public",
        &["name", "is_public", "extra_specs"],
    )
}

fn create_v2_41(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    create_with(
        ctx,
        call,
        "share_type_access:is_public",
        &["name", "is_public", "extra_specs", "description"],
    )
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, COLLECTION, call)
}

fn set_keys(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["extra_specs"], ctx.version())?;
    ctx.post(&format!("{}/{}/extra_specs", COLLECTION, call.target()?), body)
}

fn unset_keys(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let key = call
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| SfsError::InvalidArgument("an extra spec key is required".to_string()))?;
    ctx.delete(&format!(
        "{}/{}/extra_specs/{}",
        COLLECTION,
        call.target()?,
        key
    ))
}
