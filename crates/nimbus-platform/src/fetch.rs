//! Fetch Model
//!
//! Typed requests/responses and the network seam the worker agent fetches
//! through when the cache misses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use url::Url;

/// How a request was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level navigation (address bar, link click)
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// A request seen by the fetch handler
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    /// Subresource GET request
    pub fn get(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url)?,
            mode: RequestMode::NoCors,
        })
    }

    /// Top-level navigation request
    pub fn navigate(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url)?,
            mode: RequestMode::Navigate,
        })
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// Response visibility class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response, fully readable
    Basic,
    /// Cross-origin no-cors response, body opaque
    Opaque,
    /// Cross-origin response exposed via CORS
    Cors,
}

/// A response delivered to the fetch handler
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub response_type: ResponseType,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Response {
    /// Successful same-origin response
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            response_type: ResponseType::Basic,
            content_type: content_type.to_string(),
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            response_type: ResponseType::Basic,
            content_type: "text/plain".to_string(),
            body: b"not found".to_vec(),
        }
    }
}

/// Network failure (the request never produced a response)
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("offline")]
    Offline,
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Seam over the network stack
pub trait Network {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Scripted network: URL -> response table with an offline switch
#[derive(Clone, Default)]
pub struct ScriptedNetwork {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Default)]
struct ScriptedInner {
    routes: HashMap<String, Response>,
    offline: bool,
    requests: Vec<String>,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url`
    pub fn route(&self, url: &str, response: Response) {
        self.inner.lock().unwrap().routes.insert(url.to_string(), response);
    }

    /// Toggle the offline switch; while offline every fetch fails
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    /// URLs fetched so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }
}

impl Network for ScriptedNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.url.to_string());
        if inner.offline {
            return Err(NetworkError::Offline);
        }
        match inner.routes.get(request.url.as_str()) {
            Some(response) => Ok(response.clone()),
            None => Ok(Response::not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_routes_and_offline() {
        let network = ScriptedNetwork::new();
        network.route("https://app.example/", Response::ok("text/html", b"<html>".to_vec()));

        let request = Request::navigate("https://app.example/").unwrap();
        let response = network.fetch(&request).unwrap();
        assert_eq!(response.status, 200);

        network.set_offline(true);
        assert!(matches!(network.fetch(&request), Err(NetworkError::Offline)));

        let missing = Request::get("https://app.example/nope").unwrap();
        network.set_offline(false);
        assert_eq!(network.fetch(&missing).unwrap().status, 404);
    }

    #[test]
    fn test_navigation_mode() {
        assert!(Request::navigate("https://app.example/").unwrap().is_navigation());
        assert!(!Request::get("https://app.example/a.css").unwrap().is_navigation());
    }
}
