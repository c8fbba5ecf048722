//! Share replicas. Experimental from `2.11` to `2.55` and stable from `2.56`;
//! the request shapes are the same on both sides of that line, so every
//! operation registers one handler twice.

use super::{delete_at, fetch_list, fetch_one, get_at, list_at, Builder, Handler};
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::Value;

pub struct ShareReplicas<'c> {
    client: &'c Client,
}

impl<'c> ShareReplicas<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn create(
        &self,
        share_id: &str,
        availability_zone: Option<&str>,
        share_network_id: Option<&str>,
    ) -> Result<Resource> {
        if share_id.trim().is_empty() {
            return Err(SfsError::InvalidArgument("a share id is required".to_string()));
        }
        let call = Call::new()
            .param("share_id", share_id)
            .param_opt("availability_zone", availability_zone)
            .param_opt("share_network_id", share_network_id);
        fetch_one(
            self.client,
            "share_replicas.create",
            &call,
            "share_replica",
            "share_replica",
        )
    }

    pub fn list(&self, share_id: Option<&str>) -> Result<Vec<Resource>> {
        let call = Call::new().filters(QueryFilters::new().with_opt("share_id", share_id));
        fetch_list(
            self.client,
            "share_replicas.list",
            &call,
            "share_replica",
            "share_replicas",
        )
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(
            self.client,
            "share_replicas.get",
            &Call::on(id),
            "share_replica",
            "share_replica",
        )
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("share_replicas.delete", &Call::on(id))?;
        Ok(())
    }

    /// Makes the replica the active one for its share.
    pub fn promote(&self, id: &str) -> Result<()> {
        self.client.invoke("share_replicas.promote", &Call::on(id))?;
        Ok(())
    }

    pub fn resync(&self, id: &str) -> Result<()> {
        self.client.invoke("share_replicas.resync", &Call::on(id))?;
        Ok(())
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    let operations: [(&'static str, Handler); 6] = [
        ("share_replicas.create", create),
        ("share_replicas.list", list),
        ("share_replicas.get", get),
        ("share_replicas.delete", delete),
        ("share_replicas.promote", promote),
        ("share_replicas.resync", resync),
    ];
    for (name, handler) in operations {
        builder
            .register_experimental(name, "2.11", Some("2.55"), handler)?
            .register(name, "2.56", None, handler)?;
    }
    Ok(())
}

const COLLECTION: &str = "/share-replicas";

fn create(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(
        &["share_id", "availability_zone", "share_network_id"],
        ctx.version(),
    )?;
    ctx.post(COLLECTION, wrap("share_replica", body))
}

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    list_at(ctx, "/share-replicas/detail", call)
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, COLLECTION, call)
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, COLLECTION, call)
}

fn promote(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action(COLLECTION, call.target()?, "promote", Value::Null)
}

fn resync(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action(COLLECTION, call.target()?, "resync", Value::Null)
}
