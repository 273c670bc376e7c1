//! Request assembly and response classification.
//!
//! # Design
//! Both halves are pure functions: `build_request` turns a base URL and a
//! `ResourceDescriptor` into an `HttpRequest`, and `classify_response` turns
//! whatever the transport produced into an `Outcome`. The executor only glues
//! them around one `Transport::send` call, so every rule about URLs, header
//! precedence and status handling is testable without a network.

use reqwest::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, Outcome, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::resource::ResourceDescriptor;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// The only status treated as success.
pub const SUCCESS_STATUS: u16 = 200;

/// Assemble the request described by `resource` against `base_url`.
///
/// Header precedence, lowest first: the default `Content-Type`, whatever
/// `modify` sets, then `resource.headers()`.
pub fn build_request<F>(
    base_url: &str,
    resource: &ResourceDescriptor,
    modify: Option<F>,
) -> Result<HttpRequest, ApiError>
where
    F: FnOnce(&mut HttpRequest),
{
    let url = build_url(base_url, resource)?;

    let mut request = HttpRequest {
        method: resource.method(),
        url: url.into(),
        headers: Vec::new(),
        body: resource.request_body().map(<[u8]>::to_vec),
    };
    request.set_header("Content-Type", DEFAULT_CONTENT_TYPE);

    if let Some(modify) = modify {
        modify(&mut request);
    }

    for (name, value) in resource.headers() {
        request.set_header(name, value);
    }

    validate_headers(&request)?;
    Ok(request)
}

fn validate_headers(request: &HttpRequest) -> Result<(), ApiError> {
    for (name, value) in &request.headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::bad_request(format!("invalid header name {name:?}")))?;
        HeaderValue::from_str(value)
            .map_err(|_| ApiError::bad_request(format!("invalid value for header {name:?}")))?;
    }
    Ok(())
}

/// Base URL with the descriptor's path and present query parameters applied.
///
/// When the descriptor has any query parameters the base URL's own query is
/// replaced; if none of them are present the query is removed.
pub fn build_url(base_url: &str, resource: &ResourceDescriptor) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::bad_request(format!("invalid base url {base_url:?}: {e}")))?;

    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(ApiError::bad_request(format!(
            "base url {base_url:?} has no authority"
        )));
    }

    let path = resource.path();
    if !path.is_empty() && !path.starts_with('/') {
        return Err(ApiError::bad_request(format!(
            "path {path:?} must be empty or start with '/'"
        )));
    }
    url.set_path(path);

    if !resource.query_parameters().is_empty() {
        let present: Vec<(&str, &str)> = resource.present_query_parameters().collect();
        if present.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(present);
        }
    }

    Ok(url)
}

/// Map the transport result to the caller's typed outcome.
pub fn classify_response<T: DeserializeOwned>(
    response: Result<HttpResponse, TransportError>,
) -> Outcome<T> {
    let response = response?;
    check_status(&response)?;
    serde_json::from_slice(&response.body).map_err(|e| ApiError::ParsingFailed {
        message: e.to_string(),
        body: response.body,
    })
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == SUCCESS_STATUS {
        return Ok(());
    }
    Err(ApiError::NonSuccessStatus {
        status: response.status,
        body: response.body.clone(),
    })
}
