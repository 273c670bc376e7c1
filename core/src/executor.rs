//! Single-shot request execution.
//!
//! # Design
//! `RequestExecutor` holds a shared transport and a Tokio runtime handle and
//! nothing else, so concurrent calls never share request state. `execute`
//! validates and assembles the request on the caller's thread; a request that
//! cannot be built is reported to the handler right there and never spawned.
//! Everything else runs in one spawned task that performs one transport call
//! and hands one `Outcome` to the handler. There is no retry loop.
//!
//! The handler travels inside a `Delivery` guard. If the task is dropped
//! without finishing (the runtime shut down, or the transport panicked) the
//! guard reports a transport error instead, so only `RequestHandle::cancel`
//! can suppress the outcome.

use std::marker::PhantomData;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{build_request, classify_response, SUCCESS_STATUS};
use crate::config::TransportConfig;
use crate::error::{ApiError, ConfigError, Outcome};
use crate::http::HttpRequest;
use crate::resource::ResourceDescriptor;
use crate::transport::{ReqwestTransport, Transport};

type NoHook = fn(&mut HttpRequest);

/// Issues one HTTP call per invocation and reports one outcome.
pub struct RequestExecutor<T> {
    transport: Arc<T>,
    runtime: Handle,
}

impl<T> Clone for RequestExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            runtime: self.runtime.clone(),
        }
    }
}

impl RequestExecutor<ReqwestTransport> {
    pub fn from_config(config: &TransportConfig, runtime: Handle) -> Result<Self, ConfigError> {
        Ok(Self::new(ReqwestTransport::from_config(config)?, runtime))
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            runtime,
        }
    }

    /// Perform the request and await its outcome on the current task.
    pub async fn send<R>(&self, base_url: &str, resource: &ResourceDescriptor) -> Outcome<R>
    where
        R: DeserializeOwned,
    {
        self.send_inner(base_url, resource, None::<NoHook>).await
    }

    /// Like `send`, with `modify` applied to the assembled request before
    /// the descriptor's own headers.
    pub async fn send_with<R, F>(
        &self,
        base_url: &str,
        resource: &ResourceDescriptor,
        modify: F,
    ) -> Outcome<R>
    where
        R: DeserializeOwned,
        F: FnOnce(&mut HttpRequest),
    {
        self.send_inner(base_url, resource, Some(modify)).await
    }

    /// Dispatch the request in the background and deliver its outcome to
    /// `on_result`.
    ///
    /// Returns `None` when the request could not be built; `on_result` has
    /// then already been called with `ApiError::BadRequest` on this thread.
    /// Otherwise `on_result` runs exactly once, unless the returned handle is
    /// cancelled first. It normally runs on a runtime worker; if the runtime
    /// is already shut down it runs on this thread with a transport error.
    pub fn execute<R, H>(
        &self,
        base_url: &str,
        resource: &ResourceDescriptor,
        on_result: H,
    ) -> Option<RequestHandle>
    where
        R: DeserializeOwned + Send + 'static,
        H: FnOnce(Outcome<R>) + Send + 'static,
    {
        self.execute_inner(base_url, resource, None::<NoHook>, on_result)
    }

    pub fn execute_with<R, F, H>(
        &self,
        base_url: &str,
        resource: &ResourceDescriptor,
        modify: F,
        on_result: H,
    ) -> Option<RequestHandle>
    where
        R: DeserializeOwned + Send + 'static,
        F: FnOnce(&mut HttpRequest),
        H: FnOnce(Outcome<R>) + Send + 'static,
    {
        self.execute_inner(base_url, resource, Some(modify), on_result)
    }

    async fn send_inner<R, F>(
        &self,
        base_url: &str,
        resource: &ResourceDescriptor,
        modify: Option<F>,
    ) -> Outcome<R>
    where
        R: DeserializeOwned,
        F: FnOnce(&mut HttpRequest),
    {
        let request = prepare(base_url, resource, modify)?;
        let span = request_span(Uuid::new_v4(), &request);
        dispatch(Arc::clone(&self.transport), request)
            .instrument(span)
            .await
    }

    fn execute_inner<R, F, H>(
        &self,
        base_url: &str,
        resource: &ResourceDescriptor,
        modify: Option<F>,
        on_result: H,
    ) -> Option<RequestHandle>
    where
        R: DeserializeOwned + Send + 'static,
        F: FnOnce(&mut HttpRequest),
        H: FnOnce(Outcome<R>) + Send + 'static,
    {
        let request = match prepare(base_url, resource, modify) {
            Ok(request) => request,
            Err(err) => {
                on_result(Err(err));
                return None;
            }
        };

        let id = Uuid::new_v4();
        let span = request_span(id, &request);
        let state = Arc::new(DeliveryState::default());
        let delivery = Delivery::new(on_result, Arc::clone(&state));
        let transport = Arc::clone(&self.transport);
        let task = self.runtime.spawn(
            async move {
                let outcome = dispatch::<T, R>(transport, request).await;
                delivery.deliver(outcome);
            }
            .instrument(span),
        );

        Some(RequestHandle { id, task, state })
    }
}

/// Handle to one in-flight request.
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct RequestHandle {
    id: Uuid,
    task: JoinHandle<()>,
    state: Arc<DeliveryState>,
}

impl RequestHandle {
    /// Identifier attached to this request's tracing span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Abort the request. If the outcome has not been delivered yet, it never
    /// will be.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the request ends. Returns `true` if an outcome was
    /// delivered and `false` if `cancel` suppressed it. A panic in the result
    /// handler is resumed here.
    pub async fn wait(self) -> bool {
        if let Err(err) = self.task.await {
            if err.is_panic() {
                panic::resume_unwind(err.into_panic());
            }
        }
        self.state.delivered.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct DeliveryState {
    cancelled: AtomicBool,
    delivered: AtomicBool,
}

/// Owns the result handler until an outcome is handed over.
struct Delivery<R, H>
where
    H: FnOnce(Outcome<R>),
{
    handler: Option<H>,
    state: Arc<DeliveryState>,
    _outcome: PhantomData<fn(Outcome<R>)>,
}

impl<R, H> Delivery<R, H>
where
    H: FnOnce(Outcome<R>),
{
    fn new(handler: H, state: Arc<DeliveryState>) -> Self {
        Self {
            handler: Some(handler),
            state,
            _outcome: PhantomData,
        }
    }

    fn deliver(mut self, outcome: Outcome<R>) {
        if let Some(handler) = self.handler.take() {
            self.state.delivered.store(true, Ordering::SeqCst);
            handler(outcome);
        }
    }
}

impl<R, H> Drop for Delivery<R, H>
where
    H: FnOnce(Outcome<R>),
{
    fn drop(&mut self) {
        // `deliver` empties `handler`; anything left means the task died early.
        let Some(handler) = self.handler.take() else {
            return;
        };
        if self.state.cancelled.load(Ordering::SeqCst) {
            return;
        }
        tracing::warn!("request task dropped before completion");
        self.state.delivered.store(true, Ordering::SeqCst);
        handler(Err(ApiError::Transport {
            message: "request task dropped before completion".to_string(),
        }));
    }
}

fn prepare<F>(
    base_url: &str,
    resource: &ResourceDescriptor,
    modify: Option<F>,
) -> Result<HttpRequest, ApiError>
where
    F: FnOnce(&mut HttpRequest),
{
    let request = build_request(base_url, resource, modify).inspect_err(|err| {
        tracing::warn!(
            base_url,
            path = resource.path(),
            error = %err,
            "request rejected before dispatch"
        );
    })?;

    #[cfg(feature = "request-logging")]
    log_request(&request);

    Ok(request)
}

async fn dispatch<T, R>(transport: Arc<T>, request: HttpRequest) -> Outcome<R>
where
    T: Transport,
    R: DeserializeOwned,
{
    let response = transport.send(request).await;
    match &response {
        Ok(response) if response.status != SUCCESS_STATUS => tracing::debug!(
            status = response.status,
            body = %response.body_text(),
            "non-success response"
        ),
        Ok(response) => tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            "response received"
        ),
        Err(err) => tracing::warn!(error = %err, "no response"),
    }

    let outcome = classify_response(response);
    if let Err(err) = &outcome {
        tracing::debug!(kind = %err.kind(), error = %err, "request failed");
    }
    outcome
}

fn request_span(id: Uuid, request: &HttpRequest) -> tracing::Span {
    tracing::debug_span!(
        "request",
        request_id = %id,
        method = %request.method,
        url = %request.url,
    )
}

#[cfg(feature = "request-logging")]
fn log_request(request: &HttpRequest) {
    let query = crate::query::query_params(&request.url).unwrap_or_default();
    let body = request
        .body
        .as_deref()
        .map(|b| String::from_utf8_lossy(b).into_owned());
    tracing::debug!(
        url = %request.url,
        query = ?query,
        body = body.as_deref().unwrap_or(""),
        "outgoing request"
    );
}
