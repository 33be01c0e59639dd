//! One-shot HTTP exchanges that report back through a callback.
//!
//! On native targets every request runs on its own worker thread with the blocking client, on
//! the web it is driven by the browser's event loop. Either way the callback fires exactly once,
//! never on the thread that is drawing the UI, so callers hand the result over a channel.

use log::debug;
use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("could not encode request body: {0}")]
    Body(serde_json::Error),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    body: Option<serde_json::Value>,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self { url, body: None }
    }

    pub fn post_json<B: Serialize>(url: Url, body: &B) -> Result<Self, FetchError> {
        let body = serde_json::to_value(body).map_err(FetchError::Body)?;
        Ok(Self {
            url,
            body: Some(body),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
}

pub fn parse_url_with_params(url: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    Url::parse_with_params(url, params).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
}

/// Fetch the raw response body
pub fn fetch_bytes<F>(request: Request, respond: F)
where
    F: FnOnce(Result<Vec<u8>, FetchError>) + Send + 'static,
{
    debug!("fetching {}", request.url);
    spawn(request, respond);
}

/// Fetch and deserialize a JSON response body
pub fn fetch_json<T, F>(request: Request, respond: F)
where
    T: DeserializeOwned,
    F: FnOnce(Result<T, FetchError>) + Send + 'static,
{
    fetch_bytes(request, move |result| {
        respond(result.and_then(|bytes| serde_json::from_slice(&bytes).map_err(FetchError::from)))
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn<F>(request: Request, respond: F)
where
    F: FnOnce(Result<Vec<u8>, FetchError>) + Send + 'static,
{
    std::thread::spawn(move || respond(send_blocking(&request)));
}

#[cfg(not(target_arch = "wasm32"))]
static BLOCKING_CLIENT: std::sync::OnceLock<reqwest::blocking::Client> =
    std::sync::OnceLock::new();

/// The client shared by all requests, clones share one connection pool
#[cfg(not(target_arch = "wasm32"))]
fn blocking_client() -> Result<reqwest::blocking::Client, FetchError> {
    if let Some(client) = BLOCKING_CLIENT.get() {
        return Ok(client.clone());
    }
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None::<std::time::Duration>)
        .build()?;
    // another thread may have set it first
    Ok(BLOCKING_CLIENT.get_or_init(|| client).clone())
}

#[cfg(not(target_arch = "wasm32"))]
fn send_blocking(request: &Request) -> Result<Vec<u8>, FetchError> {
    let client = blocking_client()?;

    let builder = match &request.body {
        Some(body) => client.post(request.url.clone()).json(body),
        None => client.get(request.url.clone()),
    };

    let response = builder.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.bytes()?.to_vec())
}

#[cfg(target_arch = "wasm32")]
fn spawn<F>(request: Request, respond: F)
where
    F: FnOnce(Result<Vec<u8>, FetchError>) + Send + 'static,
{
    wasm_bindgen_futures::spawn_local(async move { respond(send_async(&request).await) });
}

#[cfg(target_arch = "wasm32")]
async fn send_async(request: &Request) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::Client::new();

    let builder = match &request.body {
        Some(body) => client.post(request.url.clone()).json(body),
        None => client.get(request.url.clone()),
    };

    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_query_parameters_are_encoded() {
        let url = parse_url_with_params(
            "https://example.com/autocomplete/json",
            &[("input", "1 Market St, San Francisco"), ("key", "k")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/autocomplete/json?input=1+Market+St%2C+San+Francisco&key=k"
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_blocking_client_is_shared() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| blocking_client().is_ok()))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert!(BLOCKING_CLIENT.get().is_some());
        assert!(blocking_client().is_ok());
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            parse_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_post_body_is_json() {
        #[derive(Serialize)]
        struct Body {
            a: u32,
        }
        let request =
            Request::post_json(parse_url("http://localhost/x").unwrap(), &Body { a: 1 }).unwrap();
        assert_eq!(request.body, Some(serde_json::json!({ "a": 1 })));
    }
}
