use crate::traits::Transport;
use crate::types::{TransportFailure, TransportRequest, TransportResponse};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

type Outcome = Result<TransportResponse, TransportFailure>;

fn status_outcome(status: u16, body: &str) -> Outcome {
    if (200..300).contains(&status) {
        Ok(TransportResponse::new(status, HashMap::new(), body.to_string()))
    } else {
        Err(TransportFailure::Status {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        })
    }
}

/// Scripted in-memory transport for testing.
///
/// Outcomes are picked in order: a route whose path the URL ends with, then the
/// next scripted outcome, then the fallback.
pub struct MockTransport {
    script: Mutex<VecDeque<Outcome>>,
    routes: HashMap<String, (Outcome, Duration)>,
    fallback: Option<Outcome>,
    delay: Duration,
    calls: Mutex<Vec<(Instant, TransportRequest)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            routes: HashMap::new(),
            fallback: None,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.push(status_outcome(status, body))
    }

    pub fn then_json(self, status: u16, body: Value) -> Self {
        self.push(status_outcome(status, &body.to_string()))
    }

    pub fn then_fail(self, failure: TransportFailure) -> Self {
        self.push(Err(failure))
    }

    pub fn always_status(mut self, status: u16, body: &str) -> Self {
        self.fallback = Some(status_outcome(status, body));
        self
    }

    pub fn always_json(mut self, status: u16, body: Value) -> Self {
        self.fallback = Some(status_outcome(status, &body.to_string()));
        self
    }

    pub fn always_fail(mut self, failure: TransportFailure) -> Self {
        self.fallback = Some(Err(failure));
        self
    }

    /// Answer every request to `path` with a JSON body after `delay`
    pub fn route_json(mut self, path: &str, status: u16, body: Value, delay: Duration) -> Self {
        self.routes.insert(
            path.to_string(),
            (status_outcome(status, &body.to_string()), delay),
        );
        self
    }

    /// Fail every request to `path` after `delay`
    pub fn route_fail(mut self, path: &str, failure: TransportFailure, delay: Duration) -> Self {
        self.routes.insert(path.to_string(), (Err(failure), delay));
        self
    }

    /// Delay applied to every unrouted request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// When each request was sent, relative to `origin`
    pub fn call_offsets(&self, origin: Instant) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(at, _)| at.duration_since(origin))
            .collect()
    }

    fn push(self, outcome: Outcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    fn next_outcome(&self, url: &str) -> (Outcome, Duration) {
        if let Some((outcome, delay)) = self
            .routes
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, route)| route.clone())
        {
            return (outcome, delay);
        }

        let scripted = self.script.lock().unwrap().pop_front();
        let outcome = scripted.or_else(|| self.fallback.clone()).unwrap_or_else(|| {
            Err(TransportFailure::Other(format!(
                "no scripted response for {}",
                url
            )))
        });
        (outcome, self.delay)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Outcome {
        let (outcome, delay) = self.next_outcome(&request.url);
        self.calls.lock().unwrap().push((Instant::now(), request));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
