use crate::error::{GatewayError, ProxyResult, Result};
use crate::proxy::ServiceProxy;
use crate::traits::Transport;
use crate::types::RequestOptions;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Keyed outcome of a batch: `None` marks a leg that failed
pub type AggregationResult = HashMap<String, Option<Value>>;

/// One leg of a parallel batch: a GET through `proxy` whose data lands under `key`
pub struct AggregationRequest<'a, T: Transport> {
    pub proxy: &'a ServiceProxy<T>,
    pub path: String,
    pub params: Option<HashMap<String, String>>,
    pub key: String,
}

impl<'a, T: Transport> AggregationRequest<'a, T> {
    pub fn new<K: Into<String>, P: Into<String>>(key: K, proxy: &'a ServiceProxy<T>, path: P) -> Self {
        Self {
            proxy,
            path: path.into(),
            params: None,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }
}

/// Issue every leg concurrently and wait for all of them to settle.
///
/// A failed leg maps to `None` and never aborts the batch. The only error is a
/// duplicate key, reported before anything is sent.
pub async fn aggregate<T: Transport>(requests: &[AggregationRequest<'_, T>]) -> Result<AggregationResult> {
    ensure_unique_keys(requests)?;

    let mut result = AggregationResult::with_capacity(requests.len());
    for (key, outcome) in run_legs(requests).await {
        result.insert(key.to_string(), outcome.ok());
    }
    Ok(result)
}

pub(crate) fn ensure_unique_keys<T: Transport>(requests: &[AggregationRequest<'_, T>]) -> Result<()> {
    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        if !seen.insert(request.key.as_str()) {
            return Err(GatewayError::DuplicateKey {
                key: request.key.clone(),
            });
        }
    }
    Ok(())
}

/// Poll all legs on the current task, collecting them in completion order
pub(crate) async fn run_legs<'r, T: Transport>(
    requests: &'r [AggregationRequest<'_, T>],
) -> Vec<(&'r str, ProxyResult<Value>)> {
    let mut legs: FuturesUnordered<_> = requests
        .iter()
        .map(|leg| async move {
            let outcome = leg
                .proxy
                .get::<Value>(&leg.path, leg.params.as_ref(), RequestOptions::default())
                .await
                .map(|response| response.data);

            if let Err(error) = &outcome {
                warn!(
                    key = %leg.key,
                    service = %leg.proxy.name(),
                    path = %leg.path,
                    status = ?error.status,
                    classification = %error.kind,
                    error = %error,
                    "batch leg failed"
                );
            }
            (leg.key.as_str(), outcome)
        })
        .collect();

    let mut settled = Vec::with_capacity(requests.len());
    while let Some(outcome) = legs.next().await {
        settled.push(outcome);
    }
    settled
}
