use thiserror::Error;

/// Errors that abort a whole enrichment run before any row is processed
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("API key for the geocoding service is not set. Pass --api-key or set GOOGLE_MAPS_API_KEY.")]
    MissingCredential,

    #[error("The input file must contain 'latitude' and 'longitude' columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure of a single reverse-geocoding request.
///
/// None of these stop a batch; the driver records them against the row and
/// moves on.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed: HTTP status {0}")]
    HttpStatus(u16),

    #[error("Geocoding API error: {status}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    ApiStatus {
        status: String,
        message: Option<String>,
    },

    #[error("Malformed geocoding response: {0}")]
    MalformedResponse(String),
}

/// How loudly a per-row problem is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl GeocodeError {
    /// Provider-reported statuses are warnings, everything else is an error
    pub fn severity(&self) -> Severity {
        match self {
            GeocodeError::ApiStatus { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let err = EnrichError::MissingColumns(vec!["latitude", "longitude"]);
        let msg = err.to_string();
        assert!(msg.contains("missing: latitude, longitude"));
    }

    #[test]
    fn test_api_status_message_contains_literal_status() {
        let err = GeocodeError::ApiStatus {
            status: "ZERO_RESULTS".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "Geocoding API error: ZERO_RESULTS");
        assert_eq!(err.severity(), Severity::Warning);

        let err = GeocodeError::ApiStatus {
            status: "REQUEST_DENIED".to_string(),
            message: Some("The provided API key is invalid.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Geocoding API error: REQUEST_DENIED (The provided API key is invalid.)"
        );
    }

    #[test]
    fn test_failures_are_errors() {
        assert_eq!(GeocodeError::HttpStatus(500).severity(), Severity::Error);
        assert_eq!(
            GeocodeError::MalformedResponse("no results".into()).severity(),
            Severity::Error
        );
    }
}
