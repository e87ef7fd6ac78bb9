//! Shared helpers for the wiremock-backed integration tests

#![allow(dead_code)]

use service_proxy::{RetryPolicy, ServiceConfig, ServiceProxy};
use std::net::TcpListener;

/// Fast backoff so retry scenarios finish quickly against real sockets
pub fn fast_retries() -> RetryPolicy {
    RetryPolicy::new(10, 40)
}

/// Proxy against `base_url` with fast retries
pub fn proxy(name: &str, base_url: &str, max_retries: u32) -> ServiceProxy {
    let config = ServiceConfig::new(base_url)
        .with_timeout_ms(2_000)
        .with_max_retries(max_retries);
    ServiceProxy::new(name, config)
        .expect("valid proxy config")
        .with_retry_policy(fast_retries())
}

/// Address of a local port nothing is listening on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
