use crate::cli::HttpMethod;
use crate::error::{CliError, Result};
use anyhow::{bail, Context};
use serde_json::Value;
use service_proxy::{ApiResponse, RequestOptions};
use std::collections::HashMap;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CallArgs {
    pub service: String,
    pub path: String,
    pub method: HttpMethod,
    pub query: Vec<String>,
    pub body: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

pub fn execute(config: Option<String>, args: CallArgs) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;

    rt.block_on(execute_async(config, args))
}

async fn execute_async(config: Option<String>, args: CallArgs) -> Result<()> {
    let params = parse_query(&args.query)?;
    let body = args
        .body
        .as_deref()
        .map(|raw| serde_json::from_str::<Value>(raw).context("Invalid --body JSON"))
        .transpose()?;

    let options = RequestOptions {
        timeout_ms: args.timeout_ms,
        max_retries: args.retries,
    };

    let registry = crate::load_registry(config.as_deref())?;
    let proxy = registry.get(&args.service)?;

    let outcome = proxy
        .request::<Value>(
            args.method.into(),
            &args.path,
            body.as_ref(),
            (!params.is_empty()).then_some(&params),
            options,
        )
        .await;

    match outcome {
        Ok(response) => {
            let envelope = ApiResponse::success_with_meta(
                response.data,
                serde_json::json!({
                    "service": args.service,
                    "status": response.status,
                    "responseTimeMs": response.response_time_ms,
                }),
            );
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
        Err(error) => {
            let envelope: ApiResponse<Value> = ApiResponse::from(&error);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Err(CliError::Proxy(error))
        }
    }
}

/// `name=value` pairs into a query map
pub fn parse_query(pairs: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Query parameter '{}' must be written as name=value", pair);
        };
        if name.trim().is_empty() {
            bail!("Query parameter '{}' has an empty name", pair);
        }
        params.insert(name.trim().to_string(), value.to_string());
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = parse_query(&["page=2".to_string(), "filter=a=b".to_string()]).unwrap();
        assert_eq!(params["page"], "2");
        assert_eq!(params["filter"], "a=b");

        assert!(parse_query(&["page".to_string()]).is_err());
        assert!(parse_query(&["=2".to_string()]).is_err());
    }
}
