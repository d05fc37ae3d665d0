//! Error types for response normalization

use thiserror::Error;

use crate::sources::ChartSource;

/// Errors turning a raw payload into a chart series
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{chart} payload is not an object")]
    NotAnObject { chart: ChartSource },

    #[error("{chart} field '{field}' has an unexpected shape")]
    Shape {
        chart: ChartSource,
        field: &'static str,
        #[source]
        cause: serde_json::Error,
    },
}
