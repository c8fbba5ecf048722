//! # sfsclient Architecture
//!
//! sfsclient is a **library for the Shared File System API** that happens to
//! ship a CLI (`sfs`). The CLI is one client of the library, not the other way
//! round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders tables, owns exit codes        │
//! │  - The ONLY place that knows about stdout/stderr            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Manager Layer (v2/*.rs)                                    │
//! │  - One manager per resource type, typed arguments           │
//! │  - Versioned handlers build the request for each range      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatch (dispatch.rs, version.rs)                         │
//! │  - Registry of (operation, version range, handler)          │
//! │  - Resolution against the session's negotiated version     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session + Transport (client.rs, transport/)                │
//! │  - Headers, fault decoding, HTTP via the Transport trait    │
//! │  - HttpTransport (production), MockTransport (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Microversions
//!
//! The service changes request shapes at numbered API versions. A session
//! settles on one version when it is built (explicitly, or by asking the
//! service for its range) and every call is routed to the handler registered
//! for that version. Calling an operation the negotiated version does not
//! offer fails with [`error::SfsError::UnsupportedVersion`] before any request
//! is sent.
//!
//! ## No I/O Assumptions in the Library
//!
//! Nothing outside `cli/` prints or exits. The completion cache is the only
//! file the library writes, and it is best effort.
//!
//! ## Testing Strategy
//!
//! 1. **Dispatch and versions**: pure unit tests.
//! 2. **Managers** (`v2/*.rs`): request shapes per version, checked against
//!    [`transport::memory::MockTransport`] with canned responses.
//! 3. **CLI** (`tests/`): the built binary against a local HTTP responder.
//!
//! ## Module Overview
//!
//! - [`client`]: session builder, negotiated version, request plumbing
//! - [`dispatch`]: versioned method registry and resolver
//! - [`version`]: `major.minor` API versions and negotiation
//! - [`v2`]: resource managers and their versioned handlers
//! - [`resource`]: JSON-backed resource snapshots
//! - [`query`]: list filters and query strings
//! - [`find`]: name-or-id lookup
//! - [`batch`]: multi-item commands with aggregate failure
//! - [`cache`]: completion id cache
//! - [`config`]: persisted CLI defaults
//! - [`error`]: error types
//! - `cli`: argument parsing, rendering and completion for the binary (not part of the lib API)

pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod find;
pub mod query;
pub mod resource;
pub mod transport;
pub mod v2;
pub mod version;
