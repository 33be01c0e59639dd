use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::fetch::{self, FetchError, Request};

pub const PLACES_AUTOCOMPLETE_URL: &str =
    "https://maps.googleapis.com/maps/api/place/autocomplete/json";

/// Status of a place suggestion lookup, as reported by the Places service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
}

/// Wire format of the Places autocomplete response, only the fields we use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// Outcome of one suggestion lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub status: PlacesStatus,
    pub descriptions: Vec<String>,
}

impl Lookup {
    pub fn ok(descriptions: Vec<String>) -> Self {
        Self {
            status: PlacesStatus::Ok,
            descriptions,
        }
    }

    pub fn failed(status: PlacesStatus) -> Self {
        Self {
            status,
            descriptions: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PlacesStatus::Ok
    }
}

impl From<PlacesResponse> for Lookup {
    fn from(response: PlacesResponse) -> Self {
        Self {
            status: response.status,
            descriptions: response
                .predictions
                .into_iter()
                .map(|p| p.description)
                .collect(),
        }
    }
}

impl From<Result<PlacesResponse, FetchError>> for Lookup {
    fn from(result: Result<PlacesResponse, FetchError>) -> Self {
        match result {
            Ok(response) => response.into(),
            Err(e) => {
                warn!("place suggestion lookup failed: {}", e);
                Lookup::failed(PlacesStatus::UnknownError)
            }
        }
    }
}

pub type LookupCallback = Box<dyn FnOnce(Lookup) + Send>;

/// Something that can complete a partial address into full place descriptions
pub trait SuggestionService {
    /// Start a lookup for `input`; `respond` is called once when it completes, possibly from
    /// another thread
    fn predictions(&self, input: &str, respond: LookupCallback);
}

/// Suggestions from the Google Places autocomplete web service
pub struct GooglePlaces {
    endpoint: String,
    api_key: String,
}

impl GooglePlaces {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl SuggestionService for GooglePlaces {
    fn predictions(&self, input: &str, respond: LookupCallback) {
        let url = match fetch::parse_url_with_params(
            &self.endpoint,
            &[("input", input), ("key", &self.api_key)],
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!("cannot build suggestion request: {}", e);
                respond(Lookup::failed(PlacesStatus::InvalidRequest));
                return;
            }
        };

        debug!("looking up suggestions for {:?}", input);
        fetch::fetch_json(Request::get(url), move |result: Result<PlacesResponse, _>| {
            respond(result.into())
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_places_response() {
        let json = r#"{
            "predictions": [
                {"description": "1 Market Street, San Francisco, CA, USA", "place_id": "a"},
                {"description": "1 Market Street, Oakland, CA, USA", "place_id": "b"}
            ],
            "status": "OK"
        }"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        let lookup = Lookup::from(response);

        assert!(lookup.is_ok());
        assert_eq!(
            lookup.descriptions,
            vec![
                "1 Market Street, San Francisco, CA, USA".to_string(),
                "1 Market Street, Oakland, CA, USA".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_failure_statuses() {
        let response: PlacesResponse =
            serde_json::from_str(r#"{"predictions": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert_eq!(response.status, PlacesStatus::ZeroResults);

        let response: PlacesResponse =
            serde_json::from_str(r#"{"status": "REQUEST_DENIED", "error_message": "no"}"#)
                .unwrap();
        assert_eq!(response.status, PlacesStatus::RequestDenied);
        assert!(response.predictions.is_empty());

        let response: PlacesResponse =
            serde_json::from_str(r#"{"status": "SOMETHING_NEW"}"#).unwrap();
        assert_eq!(response.status, PlacesStatus::Other);
    }

    #[test]
    fn test_transport_error_is_not_ok() {
        let lookup = Lookup::from(Err::<PlacesResponse, _>(FetchError::Status(500)));
        assert!(!lookup.is_ok());
        assert!(lookup.descriptions.is_empty());
    }
}
