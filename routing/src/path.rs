use log::info;
use serde::{Deserialize, Serialize};

use crate::fetch::{self, FetchError, Request};
use crate::geo::LatLng;

pub const DEFAULT_PATH_URL: &str = "http://localhost:8000/api/py/shortest-path";

/// An ordered route, first point is the start
pub type Path = Vec<LatLng>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRequest {
    pub start_address: String,
    pub end_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Path,
    #[serde(default)]
    pub directions: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not reach the path service: {0}")]
    Network(String),
    #[error("path service responded with status {0}")]
    Status(u16),
    #[error("malformed path response: {0}")]
    Malformed(String),
}

impl From<FetchError> for PathError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Status(status) => PathError::Status(status),
            FetchError::Decode(e) => PathError::Malformed(e.to_string()),
            e @ (FetchError::InvalidUrl(_) | FetchError::Body(_) | FetchError::Network(_)) => {
                PathError::Network(e.to_string())
            }
        }
    }
}

pub type PathCallback = Box<dyn FnOnce(Result<PathResponse, PathError>) + Send>;

/// Computes the route between two addresses
pub trait PathService {
    /// Start a request; `respond` is called once when it settles, possibly from another thread
    fn shortest_path(&self, request: PathRequest, respond: PathCallback);
}

/// Posts the request as JSON to a remote endpoint
pub struct HttpPathService {
    url: String,
}

impl HttpPathService {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl PathService for HttpPathService {
    fn shortest_path(&self, request: PathRequest, respond: PathCallback) {
        let request = match fetch::parse_url(&self.url)
            .and_then(|url| Request::post_json(url, &request))
        {
            Ok(request) => request,
            Err(e) => {
                respond(Err(e.into()));
                return;
            }
        };

        info!("requesting path from {}", request.url());
        fetch::fetch_json(request, move |result: Result<PathResponse, FetchError>| {
            respond(result.map_err(PathError::from))
        });
    }
}
