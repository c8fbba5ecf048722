use super::{fetch_list, Builder};
use crate::client::{Call, CallContext, Client};
use crate::error::Result;
use crate::resource::Resource;
use serde_json::Value;

pub struct AvailabilityZones<'c> {
    client: &'c Client,
}

impl<'c> AvailabilityZones<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Resource>> {
        fetch_list(
            self.client,
            "availability_zones.list",
            &Call::new(),
            "availability_zone",
            "availability_zones",
        )
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("availability_zones.list", "2.0", Some("2.6"), list_legacy)?
        .register("availability_zones.list", "2.7", None, list)?;
    Ok(())
}

fn list_legacy(ctx: &CallContext<'_>, _call: &Call) -> Result<Option<Value>> {
    ctx.get("/os-availability-zone")
}

fn list(ctx: &CallContext<'_>, _call: &Call) -> Result<Option<Value>> {
    ctx.get("/availability-zones")
}
