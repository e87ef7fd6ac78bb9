use crate::error::{CliError, Result};
use anyhow::bail;
use service_proxy::{aggregate, AggregationRequest, ApiResponse};
use tokio::runtime::Runtime;

/// Parsed `key=service:/path` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub key: String,
    pub service: String,
    pub path: String,
}

pub fn execute(config: Option<String>, legs: Vec<String>) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;

    rt.block_on(execute_async(config, legs))
}

async fn execute_async(config: Option<String>, legs: Vec<String>) -> Result<()> {
    let parsed = legs
        .iter()
        .map(|raw| parse_leg(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let registry = crate::load_registry(config.as_deref())?;
    let mut requests = Vec::with_capacity(parsed.len());
    for leg in &parsed {
        let proxy = registry.get(&leg.service)?;
        requests.push(AggregationRequest::new(leg.key.clone(), proxy, leg.path.clone()));
    }

    let result = aggregate(&requests).await?;
    let failed = result.values().filter(|v| v.is_none()).count();

    let envelope = ApiResponse::success_with_meta(
        result,
        serde_json::json!({ "legs": parsed.len(), "failed": failed }),
    );
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

pub fn parse_leg(raw: &str) -> anyhow::Result<Leg> {
    let Some((key, target)) = raw.split_once('=') else {
        bail!("Leg '{}' must be written as key=service:/path", raw);
    };
    let Some((service, path)) = target.split_once(':') else {
        bail!("Leg '{}' must name a service and a path separated by ':'", raw);
    };

    if key.trim().is_empty() || service.trim().is_empty() {
        bail!("Leg '{}' needs both a key and a service", raw);
    }

    Ok(Leg {
        key: key.trim().to_string(),
        service: service.trim().to_string(),
        path: path.trim().to_string(),
    })
}
