//! Share snapshots. Actions lose their `os-` prefix at `2.7`; `metadata` on
//! create is accepted from `2.73`.

use super::{
    check_choice, delete_at, fetch_list, fetch_one, get_at, list_at, string_map, Builder,
    RESOURCE_STATES,
};
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::find::Lookup;
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct SnapshotCreate {
    pub share_id: String,
    pub force: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

pub struct Snapshots<'c> {
    client: &'c Client,
}

impl<'c> Snapshots<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn create(&self, request: &SnapshotCreate) -> Result<Resource> {
        if request.share_id.trim().is_empty() {
            return Err(SfsError::InvalidArgument("a share id is required".to_string()));
        }
        let mut call = Call::new()
            .param("share_id", request.share_id.as_str())
            .param("force", request.force)
            .param_opt("name", request.name.as_deref())
            .param_opt("description", request.description.as_deref());
        if !request.metadata.is_empty() {
            call = call.param("metadata", string_map(&request.metadata));
        }
        fetch_one(self.client, "snapshots.create", &call, "snapshot", "snapshot")
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(self.client, "snapshots.get", &Call::on(id), "snapshot", "snapshot")
    }

    pub fn list(&self, filters: QueryFilters) -> Result<Vec<Resource>> {
        let call = Call::new().filters(filters);
        fetch_list(self.client, "snapshots.list", &call, "snapshot", "snapshots")
    }

    pub fn update(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Resource> {
        let call = Call::on(id)
            .param_opt("display_name", name)
            .param_opt("display_description", description);
        if call.params().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a name or description is required".to_string(),
            ));
        }
        fetch_one(self.client, "snapshots.update", &call, "snapshot", "snapshot")
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("snapshots.delete", &Call::on(id))?;
        Ok(())
    }

    pub fn force_delete(&self, id: &str) -> Result<()> {
        self.client.invoke("snapshots.force_delete", &Call::on(id))?;
        Ok(())
    }

    pub fn reset_state(&self, id: &str, state: &str) -> Result<()> {
        check_choice("state", state, RESOURCE_STATES)?;
        let call = Call::on(id).param("status", state);
        self.client.invoke("snapshots.reset_state", &call)?;
        Ok(())
    }
}

impl Lookup for Snapshots<'_> {
    fn kind(&self) -> &'static str {
        "snapshot"
    }

    fn get(&self, id: &str) -> Result<Resource> {
        Snapshots::get(self, id)
    }

    fn list_by_name(&self, name: &str) -> Result<Vec<Resource>> {
        self.list(QueryFilters::new().with("name", name))
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("snapshots.create", "2.0", Some("2.72"), create)?
        .register("snapshots.create", "2.73", None, create_v2_73)?
        .register("snapshots.get", "2.0", None, get)?
        .register("snapshots.list", "2.0", None, list)?
        .register("snapshots.update", "2.0", None, update)?
        .register("snapshots.delete", "2.0", None, delete)?
        .register("snapshots.force_delete", "2.0", Some("2.6"), force_delete_legacy)?
        .register("snapshots.force_delete", "2.7", None, force_delete)?
        .register("snapshots.reset_state", "2.0", Some("2.6"), reset_state_legacy)?
        .register("snapshots.reset_state", "2.7", None, reset_state)?;
    Ok(())
}

fn create(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["share_id", "force", "name", "description"], ctx.version())?;
    ctx.post("/snapshots", wrap("snapshot", body))
}

fn create_v2_73(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(
        &["share_id", "force", "name", "description", "metadata"],
        ctx.version(),
    )?;
    ctx.post("/snapshots", wrap("snapshot", body))
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, "/snapshots", call)
}

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    list_at(ctx, "/snapshots/detail", call)
}

fn update(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["display_name", "display_description"], ctx.version())?;
    ctx.put(&format!("/snapshots/{}", call.target()?), wrap("snapshot", body))
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, "/snapshots", call)
}

fn force_delete_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action("/snapshots", call.target()?, "os-force_delete", Value::Null)
}

fn force_delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action("/snapshots", call.target()?, "force_delete", Value::Null)
}

fn reset_state_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["status"], ctx.version())?;
    ctx.action("/snapshots", call.target()?, "os-reset_status", body)
}

fn reset_state(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["status"], ctx.version())?;
    ctx.action("/snapshots", call.target()?, "reset_status", body)
}
