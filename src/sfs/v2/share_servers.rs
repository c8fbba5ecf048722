//! Share servers. `reset_state` exists from `2.49`; server migration from
//! `2.57`, experimental throughout.

use super::{bare, check_choice, delete_at, fetch_list, fetch_one, get_at, list_at, Builder};
use crate::client::{Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::Value;

pub const SERVER_STATES: &[&str] = &[
    "active",
    "error",
    "deleting",
    "creating",
    "managing",
    "unmanage_starting",
    "unmanage_error",
    "manage_error",
    "inactive",
    "server_migrating",
    "server_migrating_to",
];

const MIGRATION_FIELDS: &[&str] = &[
    "host",
    "writable",
    "nondisruptive",
    "preserve_snapshots",
    "new_share_network_id",
];

#[derive(Debug, Clone, Default)]
pub struct ServerMigration {
    pub host: String,
    pub writable: bool,
    pub nondisruptive: bool,
    pub preserve_snapshots: bool,
    pub new_share_network_id: Option<String>,
}

impl ServerMigration {
    fn to_call(&self, id: &str) -> Result<Call> {
        if self.host.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a destination host is required".to_string(),
            ));
        }
        Ok(Call::on(id)
            .param("host", self.host.as_str())
            .param("writable", self.writable)
            .param("nondisruptive", self.nondisruptive)
            .param("preserve_snapshots", self.preserve_snapshots)
            .param_opt("new_share_network_id", self.new_share_network_id.as_deref()))
    }
}

pub struct ShareServers<'c> {
    client: &'c Client,
}

impl<'c> ShareServers<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn list(&self, filters: QueryFilters) -> Result<Vec<Resource>> {
        let call = Call::new().filters(filters);
        fetch_list(
            self.client,
            "share_servers.list",
            &call,
            "share_server",
            "share_servers",
        )
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(
            self.client,
            "share_servers.get",
            &Call::on(id),
            "share_server",
            "share_server",
        )
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("share_servers.delete", &Call::on(id))?;
        Ok(())
    }

    pub fn reset_state(&self, id: &str, state: &str) -> Result<()> {
        check_choice("state", state, SERVER_STATES)?;
        let call = Call::on(id).param("status", state);
        self.client.invoke("share_servers.reset_state", &call)?;
        Ok(())
    }

    /// Asks the service whether `migration` could run; nothing is moved.
    pub fn migration_check(&self, id: &str, migration: &ServerMigration) -> Result<Resource> {
        let body = self
            .client
            .invoke("share_servers.migration_check", &migration.to_call(id)?)?;
        bare("migration_check", body)
    }

    pub fn migration_start(&self, id: &str, migration: &ServerMigration) -> Result<()> {
        self.client
            .invoke("share_servers.migration_start", &migration.to_call(id)?)?;
        Ok(())
    }

    pub fn migration_complete(&self, id: &str) -> Result<Resource> {
        let body = self
            .client
            .invoke("share_servers.migration_complete", &Call::on(id))?;
        bare("migration_complete", body)
    }

    pub fn migration_cancel(&self, id: &str) -> Result<()> {
        self.client
            .invoke("share_servers.migration_cancel", &Call::on(id))?;
        Ok(())
    }

    pub fn migration_get_progress(&self, id: &str) -> Result<Resource> {
        let body = self
            .client
            .invoke("share_servers.migration_get_progress", &Call::on(id))?;
        bare("migration_progress", body)
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("share_servers.list", "2.0", None, list)?
        .register("share_servers.get", "2.0", None, get)?
        .register("share_servers.delete", "2.0", None, delete)?
        .register("share_servers.reset_state", "2.49", None, reset_state)?
        .register_experimental("share_servers.migration_check", "2.57", None, migration_check)?
        .register_experimental("share_servers.migration_start", "2.57", None, migration_start)?
        .register_experimental(
            "share_servers.migration_complete",
            "2.57",
            None,
            migration_complete,
        )?
        .register_experimental("share_servers.migration_cancel", "2.57", None, migration_cancel)?
        .register_experimental(
            "share_servers.migration_get_progress",
            "2.57",
            None,
            migration_get_progress,
        )?;
    Ok(())
}

const COLLECTION: &str = "/share-servers";

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    list_at(ctx, COLLECTION, call)
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, COLLECTION, call)
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, COLLECTION, call)
}

fn reset_state(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["status"], ctx.version())?;
    ctx.action(COLLECTION, call.target()?, "reset_status", body)
}

fn migration_check(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(MIGRATION_FIELDS, ctx.version())?;
    ctx.action(COLLECTION, call.target()?, "migration_check", body)
}

fn migration_start(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(MIGRATION_FIELDS, ctx.version())?;
    ctx.action(COLLECTION, call.target()?, "migration_start", body)
}

fn migration_complete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action(COLLECTION, call.target()?, "migration_complete", Value::Null)
}

fn migration_cancel(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action(COLLECTION, call.target()?, "migration_cancel", Value::Null)
}

fn migration_get_progress(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    ctx.action(COLLECTION, call.target()?, "migration_get_progress", Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EXPERIMENTAL_HEADER;
    use crate::transport::memory::fixtures::{client_at, path_of};
    use serde_json::json;

    fn migration() -> ServerMigration {
        ServerMigration {
            host: "dest@backend".into(),
            writable: true,
            ..ServerMigration::default()
        }
    }

    #[test]
    fn migration_before_2_57_never_reaches_the_network() {
        let (client, transport) = client_at("2.50");
        let err = client
            .share_servers()
            .migration_start("srv1", &migration())
            .unwrap_err();
        assert!(matches!(err, SfsError::UnsupportedVersion { .. }));
        assert!(err.to_string().contains("share_servers.migration_start"));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn migration_check_sends_experimental_action() {
        let (client, transport) = client_at("2.57");
        transport.respond_json(200, json!({"compatible": true, "requested_capabilities": {}}));
        let result = client
            .share_servers()
            .migration_check("srv1", &migration())
            .unwrap();
        assert_eq!(result.get("compatible"), Some(&json!(true)));

        let request = transport.last_request().unwrap();
        assert_eq!(path_of(&request), "/share-servers/srv1/action");
        assert_eq!(request.header(EXPERIMENTAL_HEADER), Some("True"));
        assert_eq!(
            request.body,
            Some(json!({"migration_check": {
                "host": "dest@backend",
                "writable": true,
                "nondisruptive": false,
                "preserve_snapshots": false
            }}))
        );
    }

    #[test]
    fn reset_state_exists_from_2_49() {
        let (client, transport) = client_at("2.48");
        assert!(client.share_servers().reset_state("srv1", "active").is_err());
        assert_eq!(transport.request_count(), 0);

        let (client, transport) = client_at("2.49");
        transport.respond_empty(202);
        client.share_servers().reset_state("srv1", "active").unwrap();
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"reset_status": {"status": "active"}}))
        );
    }

    #[test]
    fn list_passes_filters() {
        let (client, transport) = client_at("2.20");
        transport.respond_json(200, json!({"share_servers": [{"id": "srv1", "status": "active"}]}));
        let servers = client
            .share_servers()
            .list(QueryFilters::new().with("host", "h1"))
            .unwrap();
        assert_eq!(servers[0].status(), Some("active"));
        assert_eq!(
            path_of(&transport.last_request().unwrap()),
            "/share-servers?host=h1"
        );
    }
}
