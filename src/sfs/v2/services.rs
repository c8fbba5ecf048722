//! Manila services (scheduler, share, data). Lives under `/os-services` until
//! `2.6` and `/services` from `2.7`.

use super::{fetch_list, Builder};
use crate::client::{Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::Value;

const LEGACY_PATH: &str = "/os-services";
const PATH: &str = "/services";

pub struct Services<'c> {
    client: &'c Client,
}

impl<'c> Services<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn list(&self, filters: QueryFilters) -> Result<Vec<Resource>> {
        let call = Call::new().filters(filters);
        fetch_list(self.client, "services.list", &call, "service", "services")
    }

    pub fn enable(&self, host: &str, binary: &str) -> Result<Resource> {
        self.toggle("services.enable", host, binary)
    }

    pub fn disable(&self, host: &str, binary: &str) -> Result<Resource> {
        self.toggle("services.disable", host, binary)
    }

    fn toggle(&self, operation: &str, host: &str, binary: &str) -> Result<Resource> {
        if host.trim().is_empty() || binary.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "both host and binary are required".to_string(),
            ));
        }
        let call = Call::new().param("host", host).param("binary", binary);
        let body = self.client.invoke(operation, &call)?;
        super::bare("service", body)
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("services.list", "2.0", Some("2.6"), list_legacy)?
        .register("services.list", "2.7", None, list)?
        .register("services.enable", "2.0", Some("2.6"), enable_legacy)?
        .register("services.enable", "2.7", None, enable)?
        .register("services.disable", "2.0", Some("2.6"), disable_legacy)?
        .register("services.disable", "2.7", None, disable)?;
    Ok(())
}

fn list_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    super::list_at(ctx, LEGACY_PATH, call)
}

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    super::list_at(ctx, PATH, call)
}

fn toggle_at(ctx: &CallContext<'_>, call: &Call, path: &str) -> Result<Option<Value>> {
    let body = call.body(&["host", "binary"], ctx.version())?;
    ctx.put(path, body)
}

fn enable_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    toggle_at(ctx, call, "/os-services/enable")
}

fn enable(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    toggle_at(ctx, call, "/services/enable")
}

fn disable_legacy(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    toggle_at(ctx, call, "/os-services/disable")
}

fn disable(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    toggle_at(ctx, call, "/services/disable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::fixtures::{client_at, path_of};
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn list_filters_by_binary() {
        let (client, transport) = client_at("2.7");
        transport.respond_json(200, json!({"services": [{"id": 1, "binary": "manila-share", "state": "up"}]}));
        let services = client
            .services()
            .list(QueryFilters::new().with("binary", "manila-share"))
            .unwrap();
        assert_eq!(services[0].get_str("state"), Some("up"));
        assert_eq!(
            path_of(&transport.last_request().unwrap()),
            "/services?binary=manila-share"
        );
    }

    #[test]
    fn enable_and_disable_use_versioned_paths() {
        let (client, transport) = client_at("2.6");
        transport.respond_json(200, json!({"host": "h1", "binary": "manila-share", "disabled": true}));
        let service = client.services().disable("h1", "manila-share").unwrap();
        assert_eq!(service.get("disabled"), Some(&json!(true)));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(path_of(&request), "/os-services/disable");

        let (client, transport) = client_at("2.7");
        transport.respond_json(200, json!({"host": "h1", "binary": "manila-share", "disabled": false}));
        client.services().enable("h1", "manila-share").unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(path_of(&request), "/services/enable");
        assert_eq!(
            request.body,
            Some(json!({"host": "h1", "binary": "manila-share"}))
        );
    }

    #[test]
    fn toggle_requires_host_and_binary() {
        let (client, transport) = client_at("2.7");
        assert!(client.services().enable("", "manila-share").is_err());
        assert_eq!(transport.request_count(), 0);
    }
}
