//! Description of a single HTTP call.
//!
//! # Design
//! A `ResourceDescriptor` is built once with a consuming builder and then only
//! read. Query values are stored as display strings; a `None` value stays in
//! the descriptor and is skipped when the URL is assembled. Maps are ordered
//! by key so assembled URLs are reproducible, but callers should not rely on
//! query-parameter order.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Immutable description of one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    path: String,
    method: HttpMethod,
    headers: BTreeMap<String, String>,
    query_parameters: BTreeMap<String, Option<String>>,
    body: Option<Vec<u8>>,
}

impl ResourceDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            query_parameters: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(self, name: impl Into<String>, value: impl Display) -> Self {
        self.query_opt(name, Some(value))
    }

    /// Add a query parameter that may be absent. Absent values never reach
    /// the URL.
    pub fn query_opt<V: Display>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.query_parameters
            .insert(name.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Use the JSON encoding of `value` as the body.
    pub fn serialized_body<T: Serialize>(self, value: &T) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApiError::bad_request(format!("body serialization failed: {e}")))?;
        Ok(self.body(bytes))
    }

    /// Encode the present entries of `fields` as a pretty-printed JSON object.
    /// When every entry is `None` the descriptor is left without a body.
    pub fn json_body<K, I>(self, fields: I) -> Result<Self, ApiError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Option<Value>)>,
    {
        match encode_json(fields)? {
            Some(bytes) => Ok(self.body(bytes)),
            None => Ok(self),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_parameters(&self) -> &BTreeMap<String, Option<String>> {
        &self.query_parameters
    }

    /// Query parameters that will appear in the URL.
    pub fn present_query_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query_parameters
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn request_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Pretty-printed JSON object of the present entries, or `None` if there are
/// none.
pub fn encode_json<K, I>(fields: I) -> Result<Option<Vec<u8>>, ApiError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Option<Value>)>,
{
    let object: serde_json::Map<String, Value> = fields
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.into(), v)))
        .collect();
    if object.is_empty() {
        return Ok(None);
    }
    serde_json::to_vec_pretty(&object)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("body serialization failed: {e}")))
}
