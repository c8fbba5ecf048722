//! Resource locks (`2.81+`): guard a share or access rule against an action.

use super::{check_choice, delete_at, fetch_list, fetch_one, get_at, list_at, Builder};
use crate::client::{wrap, Call, CallContext, Client};
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use serde_json::Value;

pub const RESOURCE_TYPES: &[&str] = &["share", "access_rule"];
pub const RESOURCE_ACTIONS: &[&str] = &["delete", "show"];
const MAX_REASON_LEN: usize = 1023;

#[derive(Debug, Clone)]
pub struct LockCreate {
    pub resource_id: String,
    pub resource_type: String,
    pub resource_action: String,
    pub lock_reason: Option<String>,
}

impl LockCreate {
    pub fn share(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_type: "share".to_string(),
            resource_action: "delete".to_string(),
            lock_reason: None,
        }
    }
}

fn check_reason(reason: Option<&str>) -> Result<()> {
    match reason {
        Some(reason) if reason.chars().count() > MAX_REASON_LEN => {
            Err(SfsError::InvalidArgument(format!(
                "lock_reason may be at most {} characters",
                MAX_REASON_LEN
            )))
        }
        _ => Ok(()),
    }
}

pub struct ResourceLocks<'c> {
    client: &'c Client,
}

impl<'c> ResourceLocks<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    pub fn create(&self, request: &LockCreate) -> Result<Resource> {
        if request.resource_id.trim().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a resource id is required".to_string(),
            ));
        }
        check_choice("resource_type", &request.resource_type, RESOURCE_TYPES)?;
        check_choice("resource_action", &request.resource_action, RESOURCE_ACTIONS)?;
        check_reason(request.lock_reason.as_deref())?;

        let call = Call::new()
            .param("resource_id", request.resource_id.as_str())
            .param("resource_type", request.resource_type.as_str())
            .param("resource_action", request.resource_action.as_str())
            .param_opt("lock_reason", request.lock_reason.as_deref());
        fetch_one(
            self.client,
            "resource_locks.create",
            &call,
            "resource_lock",
            "resource_lock",
        )
    }

    pub fn get(&self, id: &str) -> Result<Resource> {
        fetch_one(
            self.client,
            "resource_locks.get",
            &Call::on(id),
            "resource_lock",
            "resource_lock",
        )
    }

    pub fn list(&self, filters: QueryFilters) -> Result<Vec<Resource>> {
        let call = Call::new().filters(filters);
        fetch_list(
            self.client,
            "resource_locks.list",
            &call,
            "resource_lock",
            "resource_locks",
        )
    }

    pub fn update(
        &self,
        id: &str,
        resource_action: Option<&str>,
        lock_reason: Option<&str>,
    ) -> Result<Resource> {
        if let Some(action) = resource_action {
            check_choice("resource_action", action, RESOURCE_ACTIONS)?;
        }
        check_reason(lock_reason)?;
        let call = Call::on(id)
            .param_opt("resource_action", resource_action)
            .param_opt("lock_reason", lock_reason);
        if call.params().is_empty() {
            return Err(SfsError::InvalidArgument(
                "a resource action or lock reason is required".to_string(),
            ));
        }
        fetch_one(
            self.client,
            "resource_locks.update",
            &call,
            "resource_lock",
            "resource_lock",
        )
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.invoke("resource_locks.delete", &Call::on(id))?;
        Ok(())
    }
}

pub(crate) fn register(builder: &mut Builder) -> Result<()> {
    builder
        .register("resource_locks.create", "2.81", None, create)?
        .register("resource_locks.get", "2.81", None, get)?
        .register("resource_locks.list", "2.81", None, list)?
        .register("resource_locks.update", "2.81", None, update)?
        .register("resource_locks.delete", "2.81", None, delete)?;
    Ok(())
}

const COLLECTION: &str = "/resource-locks";

fn create(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(
        &["resource_id", "resource_type", "resource_action", "lock_reason"],
        ctx.version(),
    )?;
    ctx.post(COLLECTION, wrap("resource_lock", body))
}

fn get(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    get_at(ctx, COLLECTION, call)
}

fn list(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    list_at(ctx, COLLECTION, call)
}

fn update(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    let body = call.body(&["resource_action", "lock_reason"], ctx.version())?;
    ctx.put(
        &format!("{}/{}", COLLECTION, call.target()?),
        wrap("resource_lock", body),
    )
}

fn delete(ctx: &CallContext<'_>, call: &Call) -> Result<Option<Value>> {
    delete_at(ctx, COLLECTION, call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::fixtures::{client_at, path_of};
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn locks_need_2_81() {
        let (client, transport) = client_at("2.80");
        let err = client
            .resource_locks()
            .create(&LockCreate::share("s1"))
            .unwrap_err();
        assert!(matches!(err, SfsError::UnsupportedVersion { .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn create_defaults_to_delete_lock_on_share() {
        let (client, transport) = client_at("2.81");
        transport.respond_json(200, json!({"resource_lock": {"id": "l1", "resource_id": "s1"}}));
        let lock = client
            .resource_locks()
            .create(&LockCreate {
                lock_reason: Some("audit".into()),
                ..LockCreate::share("s1")
            })
            .unwrap();
        assert_eq!(lock.id(), Some("l1"));
        let request = transport.last_request().unwrap();
        assert_eq!(path_of(&request), "/resource-locks");
        assert_eq!(
            request.body,
            Some(json!({"resource_lock": {
                "resource_id": "s1",
                "resource_type": "share",
                "resource_action": "delete",
                "lock_reason": "audit"
            }}))
        );
    }

    #[test]
    fn validates_choices_and_reason_length() {
        let (client, transport) = client_at("2.84");
        let bad_type = LockCreate {
            resource_type: "volume".into(),
            ..LockCreate::share("s1")
        };
        assert!(client.resource_locks().create(&bad_type).is_err());
        let long = "x".repeat(MAX_REASON_LEN + 1);
        assert!(client.resource_locks().update("l1", None, Some(&long)).is_err());
        assert!(client.resource_locks().update("l1", None, None).is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn update_and_list() {
        let (client, transport) = client_at("2.82");
        transport
            .respond_json(200, json!({"resource_lock": {"id": "l1"}}))
            .respond_json(200, json!({"resource_locks": [{"id": "l1"}]}));
        client
            .resource_locks()
            .update("l1", Some("show"), None)
            .unwrap();
        client
            .resource_locks()
            .list(QueryFilters::new().with("resource_id", "s1"))
            .unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(
            requests[0].body,
            Some(json!({"resource_lock": {"resource_action": "show"}}))
        );
        assert_eq!(path_of(&requests[1]), "/resource-locks?resource_id=s1");
    }
}
