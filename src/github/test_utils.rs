//! Shared test utilities for the `github` module.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{ApiRequest, GhClient};

/// Mock client answering by endpoint.
///
/// Endpoints without a scripted answer fail with `"no mock response"`, which
/// exercises the same early-stop paths as a real API error. Every request is
/// recorded so tests can assert on call order and count.
#[derive(Default)]
pub(crate) struct ScriptedGhClient {
    responses: HashMap<String, Result<String, String>>,
    calls: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedGhClient {
    /// Creates a client with no scripted responses.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful response for `endpoint`.
    pub(crate) fn respond(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(endpoint.into(), Ok(body.into()));
        self
    }

    /// Scripts a failure for `endpoint`.
    pub(crate) fn fail(mut self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(endpoint.into(), Err(message.into()));
        self
    }

    /// Returns the endpoints requested so far, in order.
    pub(crate) fn endpoints(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|r| r.endpoint.clone())
            .collect()
    }

    /// Returns the number of requests made so far.
    pub(crate) fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl GhClient for ScriptedGhClient {
    fn api<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request.clone());
        let response = match self.responses.get(&request.endpoint) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
            None => Err(anyhow::anyhow!("no mock response for {}", request.endpoint)),
        };
        Box::pin(async move { response })
    }
}
