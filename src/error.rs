use reqwest::StatusCode;

/// Why a CO2 read did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Connection, DNS, timeout or body transfer failure.
    #[error("HTTP GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP GET {url} returned {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response has no numeric `{field}` field")]
    MissingField { field: String },

    #[error("`{field}` value {value} is outside 0..=100000 ppm")]
    OutOfRange { field: String, value: f64 },
}

impl ReadError {
    /// The payload arrived but could not be turned into a reading.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            ReadError::Parse(_) | ReadError::MissingField { .. } | ReadError::OutOfRange { .. }
        )
    }
}
