use crate::error::{GeocodeError, Severity};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Google Geocoding API (JSON output)
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const STATE_COMPONENT: &str = "administrative_area_level_1";
const LGA_COMPONENT: &str = "administrative_area_level_2";

/// A latitude/longitude pair in degrees. Not range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    /// Formats as the `latlng` query value, e.g. "37.4221,-122.0841"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// State and LGA for one coordinate; either may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeResult {
    pub state: Option<String>,
    pub lga: Option<String>,
}

impl GeocodeResult {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.lga.is_none()
    }
}

/// A reverse-geocoding provider.
///
/// The credential is passed on every call so no provider has to hold it.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        api_key: &str,
    ) -> Result<GeocodeResult, GeocodeError>;
}

/// A user-facing message produced while resolving one coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// Outcome of [`resolve`]: always a result, plus a notice if something went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub result: GeocodeResult,
    pub notice: Option<Notice>,
}

/// Resolve one coordinate, turning any failure into absent values and a notice.
///
/// Errors are reported here (logged and returned as a [`Notice`]) and never
/// propagated, so one bad row cannot stop a batch.
pub fn resolve(
    geocoder: &dyn ReverseGeocoder,
    coordinate: Coordinate,
    api_key: &str,
) -> Resolution {
    match geocoder.reverse_geocode(coordinate, api_key) {
        Ok(result) => Resolution {
            result,
            notice: None,
        },
        Err(e) => {
            let severity = e.severity();
            match severity {
                Severity::Warning => log::warn!("{} for {}", e, coordinate),
                Severity::Error => log::error!("{} for {}", e, coordinate),
            }
            Resolution {
                result: GeocodeResult::default(),
                notice: Some(Notice {
                    severity,
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Option<Vec<GeocodeEntry>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    types: Vec<String>,
}

/// Parse a 2xx response body into State/LGA
pub fn parse_response(body: &str) -> Result<GeocodeResult, GeocodeError> {
    let data: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| GeocodeError::MalformedResponse(e.to_string()))?;

    if data.status != "OK" {
        return Err(GeocodeError::ApiStatus {
            status: data.status,
            message: data.error_message,
        });
    }

    let first = data
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| GeocodeError::MalformedResponse("status OK but no results".into()))?;

    Ok(extract_admin_areas(&first.address_components))
}

/// Later matching components overwrite earlier ones
fn extract_admin_areas(components: &[AddressComponent]) -> GeocodeResult {
    let mut result = GeocodeResult::default();

    for component in components {
        if component.types.iter().any(|t| t == STATE_COMPONENT) {
            result.state = Some(component.long_name.clone());
        }
        if component.types.iter().any(|t| t == LGA_COMPONENT) {
            result.lga = Some(component.long_name.clone());
        }
    }

    result
}

/// Reverse geocoder backed by the Google Geocoding API (or anything that speaks its JSON)
pub struct GoogleGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleGeocoder {
    /// Build a geocoder for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let user_agent = format!(
            "geoenrich/{} (https://github.com/h4x0r/geoenrich)",
            env!("CARGO_PKG_VERSION")
        );

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl ReverseGeocoder for GoogleGeocoder {
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        api_key: &str,
    ) -> Result<GeocodeResult, GeocodeError> {
        log::debug!("Geocoding {} via {}", coordinate, self.endpoint);

        // The request URL carries the key, so strip it from any transport error
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("latlng", coordinate.to_string().as_str()), ("key", api_key)])
            .send()
            .map_err(|e| GeocodeError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| GeocodeError::Transport(e.without_url()))?;

        parse_response(&body)
    }
}
