//! Async client for the (unofficial) Cozi family-organizer list API.
//!
//! # Overview
//! Authenticates with username and password, keeps the returned bearer token
//! and account id, and exposes one method per remote list or item operation.
//!
//! # Design
//! - `CoziClient` holds the session; only `authenticate`, `set_session_token`
//!   and `resume` change it.
//! - Every operation has a pure `build_*` counterpart producing an
//!   `HttpRequest`, so URLs and bodies are testable without a network.
//! - Failures are either `CoziError::NotAuthenticated` (local, nothing sent) or
//!   `CoziError::Api` carrying a normalized `{code, message, details}`.
//! - No retries, refresh or caching. Persisting a `Session` between runs is
//!   up to the caller.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::CoziClient;
pub use config::ClientConfig;
pub use error::{ApiError, CoziError, UNKNOWN_ERROR_CODE};
pub use http::{HttpMethod, HttpRequest};
pub use session::{AuthResponse, Credentials, Session};
pub use types::{
    AddItemRequest, AddListRequest, CoziItem, CoziList, EditItemRequest, ItemStatus, ListType,
    MarkItemRequest, RemoveItemRequest, ReorderListRequest,
};
