use crate::error::Result;
use crate::http::ResponseConverterImpl;
use crate::traits::Transport;
use crate::types::{TransportFailure, TransportRequest, TransportResponse};
use reqwest::Client;

/// `reqwest` backed transport. Each proxy owns one, and with it its own connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    response_converter: ResponseConverterImpl,
}

impl ReqwestTransport {
    /// Create a new transport; timeouts are applied per request
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::from_client(client))
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            response_converter: ResponseConverterImpl::new(),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure> {
        let mut request_builder = self
            .client
            .request(request.method, &request.url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            request_builder = request_builder.query(&request.query);
        }

        for (key, value) in &request.headers {
            request_builder = request_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| self.response_converter.convert_error(&e))?;

        self.response_converter.convert_response(response).await
    }
}
