use super::{HttpRequest, HttpResponse, Transport};
use crate::error::{Result, SfsError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// In-memory transport for testing.
///
/// Responses are replayed in the order they were queued; every request is
/// recorded. Clones share state, so a test can keep one handle while the
/// client owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: HttpResponse) -> &Self {
        self.state.borrow_mut().responses.push_back(response);
        self
    }

    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.respond(HttpResponse::new(status, Some(body)))
    }

    pub fn respond_empty(&self, status: u16) -> &Self {
        self.respond(HttpResponse::new(status, None))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state.borrow().requests.last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());
        state.responses.pop_front().ok_or_else(|| {
            SfsError::Transport(format!(
                "no response queued for {} {}",
                request.method, request.url
            ))
        })
    }
}

// --- Test Fixtures ---

pub mod fixtures {
    use super::*;
    use crate::client::{Client, ClientBuilder};
    use crate::version::ApiVersion;

    pub const ENDPOINT: &str = "http://sfs.test:8786/v2/project-1";

    /// A client pinned to `version` that talks to the returned mock.
    pub fn client_at(version: &str) -> (Client, MockTransport) {
        let transport = MockTransport::new();
        let client = ClientBuilder::new(ENDPOINT)
            .token("secret-token")
            .api_version(ApiVersion::parse(version).unwrap())
            .transport(transport.clone())
            .build()
            .unwrap();
        (client, transport)
    }

    /// Strips the endpoint so assertions read like API paths.
    pub fn path_of(request: &HttpRequest) -> &str {
        request.url.strip_prefix(ENDPOINT).unwrap_or(&request.url)
    }
}
