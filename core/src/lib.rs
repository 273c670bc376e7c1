//! Single-shot JSON request executor.
//!
//! # Overview
//! Builds one HTTP request from a base URL and a `ResourceDescriptor`, sends
//! it once, and reports exactly one `Outcome<T>`: the decoded body or a
//! classified `ApiError`.
//!
//! # Design
//! - `client` assembles requests and classifies responses without I/O.
//! - `transport` is the only network seam; `ReqwestTransport` is the default.
//! - `executor` runs one transport call per invocation on Tokio and hands the
//!   outcome to a single `FnOnce` handler, so a request can never report both
//!   success and failure, or neither.
//! - Nothing is retried. Callers layer retry and backoff on top.
//! - With the `request-logging` feature, outgoing URL, query and body are
//!   logged at `debug` through `tracing`.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod json;
pub mod query;
pub mod resource;
pub mod transport;

pub use client::{build_request, build_url, classify_response};
pub use config::TransportConfig;
pub use error::{ApiError, ConfigError, ErrorKind, Outcome, TransportError};
pub use executor::{RequestExecutor, RequestHandle};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use json::decode_object;
pub use query::{query_params, query_string};
pub use resource::{encode_json, ResourceDescriptor};
pub use transport::{ReqwestTransport, Transport};
