//! Retrying RPC client implementation.

use std::sync::Arc;

use backoff::backoff::Backoff;
use serde::Serialize;
use tracing::{debug, warn};

use crate::observer::LoadingGuard;
use crate::{
    CallObserver, ClientConfig, HttpTransport, Notice, RetryPolicy, RpcError, RpcRequest,
    RpcResponse, TracingObserver, Transport, classify_response,
};

/// Client for the schedule backend.
///
/// Cloning is cheap; clones share the transport and observer. Each call runs
/// its own retry loop and shares no mutable state with concurrent calls.
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn CallObserver>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create an HTTP client for the configured endpoint.
    pub fn new(config: &ClientConfig) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(config)?;
        debug!(endpoint = transport.endpoint(), "http transport ready");
        Ok(Self::with_transport(transport).with_policy(config.retry))
    }

    /// Create a client over an arbitrary transport with the default policy.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            observer: Arc::new(TracingObserver),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Call `action` with `payload` using the client's retry policy.
    pub async fn call<P: Serialize + ?Sized>(
        &self,
        action: &str,
        payload: &P,
    ) -> Result<RpcResponse, RpcError> {
        self.call_with_policy(action, payload, self.policy).await
    }

    /// Call `action` with an empty payload object.
    pub async fn call_empty(&self, action: &str) -> Result<RpcResponse, RpcError> {
        self.call(action, &serde_json::json!({})).await
    }

    /// Call `action` with `payload`, retrying transient failures per `policy`.
    ///
    /// The observer sees `loading_started` before the first attempt and
    /// `loading_finished` exactly once afterwards, including when this future
    /// is dropped mid-flight. A final failure is also reported through
    /// [`CallObserver::notify`] before it is returned.
    pub async fn call_with_policy<P: Serialize + ?Sized>(
        &self,
        action: &str,
        payload: &P,
        policy: RetryPolicy,
    ) -> Result<RpcResponse, RpcError> {
        let loading = LoadingGuard::start(&*self.observer, action);

        let result = match RpcRequest::encode(action, payload) {
            Ok(request) => self.run(&request, policy).await,
            Err(e) => Err(RpcError::Encode(e)),
        };

        drop(loading);

        if let Err(ref e) = result {
            self.observer.notify(&Notice::error(e.user_message()));
        }
        result
    }

    async fn run(
        &self,
        request: &RpcRequest,
        policy: RetryPolicy,
    ) -> Result<RpcResponse, RpcError> {
        let action = request.action();
        let max_attempts = policy.max_attempts();
        let mut backoff = policy.backoff();
        let mut attempt = 1;

        loop {
            let outcome = match self.transport.send(request).await {
                Ok(raw) => classify_response(raw.status, &raw.body),
                Err(e) => Err(RpcError::Transport(e)),
            };

            match outcome {
                Ok(response) => {
                    debug!(action, attempt, "call succeeded");
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = backoff
                        .next_backoff()
                        .unwrap_or_else(|| policy.delay_before_retry(attempt));
                    let timed_out = matches!(&e, RpcError::Transport(t) if t.is_timeout());
                    warn!(
                        action,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        timed_out,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(action, attempt, kind = %e.kind(), error = %e, "call failed");
                    return Err(e);
                }
            }
        }
    }
}
