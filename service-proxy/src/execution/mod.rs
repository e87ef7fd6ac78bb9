pub mod aggregate;
pub mod enrich;

pub use aggregate::{aggregate, AggregationRequest, AggregationResult};
pub use enrich::enrich;
