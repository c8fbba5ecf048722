//! # Client Session
//!
//! [`Client`] holds what every call needs: the endpoint, credentials, the
//! negotiated API version and the dispatch registry. It is built once through
//! [`ClientBuilder`] and is read-only afterwards.
//!
//! ## Call flow
//!
//! ```text
//! manager method ──► Client::invoke(op, Call)
//!                       │ resolve(op, negotiated version)   (fails before any I/O)
//!                       ▼
//!                    handler(CallContext, Call) ──► CallContext::get/post/... ──► Transport
//! ```
//!
//! Handlers only see a [`CallContext`], which knows whether the resolved
//! candidate is experimental and adds the matching header to each request.

use crate::cache::CompletionCache;
use crate::dispatch::Registry;
use crate::error::{Result, SfsError};
use crate::query::QueryFilters;
use crate::resource::Resource;
use crate::transport::http::HttpTransport;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::v2;
use crate::version::{check_supported, negotiate, ApiVersion, MAX_API_VERSION, MIN_API_VERSION};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::time::Duration;

pub const VERSION_HEADER: &str = "X-OpenStack-Manila-API-Version";
pub const EXPERIMENTAL_HEADER: &str = "X-OpenStack-Manila-API-Experimental";
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Signature shared by every versioned implementation.
pub type Handler = fn(&CallContext<'_>, &Call) -> Result<Option<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRequest {
    /// Ask the service and use the highest version both sides support.
    Latest,
    Exact(ApiVersion),
}

impl VersionRequest {
    /// `latest` and `max` both negotiate; anything else must be `X.Y`.
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "latest" | "max" => Ok(VersionRequest::Latest),
            _ => Ok(VersionRequest::Exact(ApiVersion::parse(text)?)),
        }
    }
}

pub struct ClientBuilder {
    endpoint: String,
    token: Option<String>,
    project_id: Option<String>,
    version: VersionRequest,
    transport: Option<Box<dyn Transport>>,
    timeout: Option<Duration>,
    insecure: bool,
    cache: Option<CompletionCache>,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            project_id: None,
            version: VersionRequest::Latest,
            transport: None,
            timeout: None,
            insecure: false,
            cache: None,
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.version = VersionRequest::Exact(version);
        self
    }

    pub fn version_request(mut self, version: VersionRequest) -> Self {
        self.version = version;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn completion_cache(mut self, cache: CompletionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Runs the registration pass and settles the session's API version.
    pub fn build(self) -> Result<Client> {
        let endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(SfsError::CommandError(
                "An endpoint URL is required".to_string(),
            ));
        }

        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(self.timeout, self.insecure)?),
        };
        let registry = v2::registry()?;

        let (api_version, server_versions) = match self.version {
            VersionRequest::Exact(version) => (check_supported(version)?, None),
            VersionRequest::Latest => {
                let (min, max) =
                    discover_versions(transport.as_ref(), &endpoint, self.token.as_deref())?;
                let version = negotiate(MIN_API_VERSION, MAX_API_VERSION, min, max)?;
                (version, Some((min, max)))
            }
        };
        debug!("Using API version {}", api_version);

        Ok(Client {
            endpoint,
            token: self.token,
            project_id: self.project_id,
            api_version,
            server_versions,
            transport,
            registry,
            cache: self.cache,
        })
    }
}

pub struct Client {
    endpoint: String,
    token: Option<String>,
    project_id: Option<String>,
    api_version: ApiVersion,
    server_versions: Option<(ApiVersion, ApiVersion)>,
    transport: Box<dyn Transport>,
    registry: Registry<Handler>,
    cache: Option<CompletionCache>,
}

impl Client {
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// The service's `(min, max)` range, when it was discovered during negotiation.
    pub fn server_versions(&self) -> Option<(ApiVersion, ApiVersion)> {
        self.server_versions
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn registry(&self) -> &Registry<Handler> {
        &self.registry
    }

    pub fn shares(&self) -> v2::shares::Shares<'_> {
        v2::shares::Shares::new(self)
    }

    pub fn snapshots(&self) -> v2::snapshots::Snapshots<'_> {
        v2::snapshots::Snapshots::new(self)
    }

    pub fn share_servers(&self) -> v2::share_servers::ShareServers<'_> {
        v2::share_servers::ShareServers::new(self)
    }

    pub fn share_replicas(&self) -> v2::share_replicas::ShareReplicas<'_> {
        v2::share_replicas::ShareReplicas::new(self)
    }

    pub fn quotas(&self) -> v2::quotas::Quotas<'_> {
        v2::quotas::Quotas::new(self)
    }

    pub fn resource_locks(&self) -> v2::resource_locks::ResourceLocks<'_> {
        v2::resource_locks::ResourceLocks::new(self)
    }

    pub fn share_types(&self) -> v2::share_types::ShareTypes<'_> {
        v2::share_types::ShareTypes::new(self)
    }

    pub fn availability_zones(&self) -> v2::availability_zones::AvailabilityZones<'_> {
        v2::availability_zones::AvailabilityZones::new(self)
    }

    pub fn services(&self) -> v2::services::Services<'_> {
        v2::services::Services::new(self)
    }

    /// True when `operation` has a candidate at the negotiated version.
    pub fn supports(&self, operation: &str) -> bool {
        self.registry.resolve(operation, self.api_version).is_ok()
    }

    /// Resolves `operation` for the negotiated version and runs it.
    pub fn invoke(&self, operation: &str, call: &Call) -> Result<Option<Value>> {
        let method = self.registry.resolve(operation, self.api_version)?;
        if method.experimental {
            warn!(
                "{} is experimental at API version {} and may change without notice",
                operation, self.api_version
            );
        }
        let ctx = CallContext {
            client: self,
            experimental: method.experimental,
        };
        (method.func)(&ctx, call)
    }

    /// Queries the service root for its supported version range.
    pub fn discover_versions(&self) -> Result<(ApiVersion, ApiVersion)> {
        discover_versions(self.transport.as_ref(), &self.endpoint, self.token.as_deref())
    }

    pub(crate) fn remember(&self, resources: &[Resource]) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Some(first) = resources.first() {
            cache.record(first.kind(), resources.iter().filter_map(Resource::id));
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        experimental: bool,
    ) -> Result<Option<Value>> {
        let mut headers = base_headers(self.token.as_deref());
        headers.push((VERSION_HEADER.to_string(), self.api_version.to_string()));
        if experimental {
            headers.push((EXPERIMENTAL_HEADER.to_string(), "True".to_string()));
        }
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.endpoint, path),
            headers,
            body,
        };
        exchange(self.transport.as_ref(), &request)
    }
}

/// What a versioned handler sees of the session.
pub struct CallContext<'c> {
    client: &'c Client,
    experimental: bool,
}

impl<'c> CallContext<'c> {
    pub fn version(&self) -> ApiVersion {
        self.client.api_version
    }

    pub fn client(&self) -> &'c Client {
        self.client
    }

    pub fn is_experimental(&self) -> bool {
        self.experimental
    }

    pub fn get(&self, path: &str) -> Result<Option<Value>> {
        self.client.request(Method::Get, path, None, self.experimental)
    }

    pub fn post(&self, path: &str, body: Value) -> Result<Option<Value>> {
        self.client.request(Method::Post, path, Some(body), self.experimental)
    }

    pub fn put(&self, path: &str, body: Value) -> Result<Option<Value>> {
        self.client.request(Method::Put, path, Some(body), self.experimental)
    }

    pub fn delete(&self, path: &str) -> Result<Option<Value>> {
        self.client.request(Method::Delete, path, None, self.experimental)
    }

    /// POSTs `{"<action>": params}` to `<collection>/<id>/action`.
    pub fn action(
        &self,
        collection: &str,
        id: &str,
        action: &str,
        params: Value,
    ) -> Result<Option<Value>> {
        self.post(&format!("{}/{}/action", collection, id), wrap(action, params))
    }
}

/// Typed-argument-free description of one call, handed to the resolved handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    target: Option<String>,
    params: Map<String, Value>,
    filters: QueryFilters,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn filters(mut self, filters: QueryFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn target(&self) -> Result<&str> {
        self.target
            .as_deref()
            .ok_or_else(|| SfsError::InvalidArgument("a resource id is required".to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn query(&self) -> &QueryFilters {
        &self.filters
    }

    /// Parameters as a JSON object, refusing keys outside `allowed`.
    pub fn body(&self, allowed: &[&str], version: ApiVersion) -> Result<Value> {
        if let Some(key) = self.params.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(SfsError::InvalidArgument(format!(
                "'{}' is not supported at API version {}",
                key, version
            )));
        }
        Ok(Value::Object(self.params.clone()))
    }
}

fn base_headers(token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
        (
            "User-Agent".to_string(),
            format!("sfs-client/{}", env!("CARGO_PKG_VERSION")),
        ),
    ];
    if let Some(token) = token {
        headers.push((AUTH_HEADER.to_string(), token.to_string()));
    }
    headers
}

fn exchange(transport: &dyn Transport, request: &HttpRequest) -> Result<Option<Value>> {
    exchange_accepting(transport, request, HttpResponse::is_success)
}

/// Like `exchange`, but `accept` decides which statuses carry a usable body.
fn exchange_accepting(
    transport: &dyn Transport,
    request: &HttpRequest,
    accept: fn(&HttpResponse) -> bool,
) -> Result<Option<Value>> {
    debug!("REQ: {} {}", request.method, request.url);
    if let Some(body) = &request.body {
        debug!("REQ BODY: {}", body);
    }

    let response = transport.send(request)?;
    debug!("RESP: {} {}", response.status, request.url);

    if accept(&response) {
        return Ok(response.body);
    }
    let message = fault_message(response.body.as_ref(), response.status);
    let request_id = response
        .header("x-openstack-request-id")
        .or_else(|| response.header("x-compute-request-id"));
    Err(SfsError::from_status(response.status, &message, request_id))
}

/// Extracts the human message from `{"<faultName>": {"message": ...}}`.
fn fault_message(body: Option<&Value>, status: u16) -> String {
    let from_body = match body {
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                map.values()
                    .find_map(|fault| fault.get("message").and_then(Value::as_str))
            })
            .map(String::from),
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    };
    from_body.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    })
}

fn discover_versions(
    transport: &dyn Transport,
    endpoint: &str,
    token: Option<&str>,
) -> Result<(ApiVersion, ApiVersion)> {
    let mut root = url::Url::parse(endpoint)
        .map_err(|e| SfsError::InvalidArgument(format!("invalid endpoint '{}': {}", endpoint, e)))?;
    root.set_path("/");
    root.set_query(None);

    let request = HttpRequest {
        method: Method::Get,
        url: root.to_string(),
        headers: base_headers(token),
        body: None,
    };
    // The root answers 300 Multiple Choices with the versions document.
    let body = exchange_accepting(transport, &request, |response| response.status < 400)?
        .unwrap_or(Value::Null);
    let versions = body
        .get("versions")
        .and_then(Value::as_array)
        .ok_or_else(|| SfsError::CommandError("Version document is missing 'versions'".into()))?;
    let current = versions
        .iter()
        .find(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| id.starts_with("v2"))
        })
        .ok_or_else(|| {
            SfsError::IncompatibleVersion("The service does not offer the v2 API".to_string())
        })?;

    let field = |name: &str| -> Result<ApiVersion> {
        match current.get(name).and_then(Value::as_str) {
            None | Some("") => Ok(ApiVersion::NULL),
            Some(text) => ApiVersion::parse(text),
        }
    };
    let range = (field("min_version")?, field("version")?);
    debug!("Service supports API versions {} to {}", range.0, range.1);
    Ok(range)
}

/// `{"<key>": {...}}` wrapper used by write operations.
pub(crate) fn wrap(key: &str, body: Value) -> Value {
    let mut outer = Map::new();
    outer.insert(key.to_string(), body);
    Value::Object(outer)
}
