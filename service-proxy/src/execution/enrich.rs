use crate::error::Result;
use crate::execution::aggregate::{ensure_unique_keys, run_legs, AggregationRequest};
use crate::traits::Transport;
use serde_json::{Map, Value};

/// Return a shallow copy of `base` with each leg's data stored under its key.
///
/// A failed leg sets its key to `null` only when `base` does not already carry
/// that key; an existing value is left as it was.
pub async fn enrich<T: Transport>(
    base: &Map<String, Value>,
    requests: &[AggregationRequest<'_, T>],
) -> Result<Map<String, Value>> {
    ensure_unique_keys(requests)?;

    let mut record = base.clone();
    for (key, outcome) in run_legs(requests).await {
        match outcome {
            Ok(data) => {
                record.insert(key.to_string(), data);
            }
            Err(_) => {
                record.entry(key.to_string()).or_insert(Value::Null);
            }
        }
    }
    Ok(record)
}
