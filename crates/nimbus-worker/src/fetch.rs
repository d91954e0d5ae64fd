//! Fetch Interception
//!
//! Cache-first with network fallback and opportunistic population. API
//! calls and foreign origins are never intercepted; offline navigations
//! fall back to the cached offline page.

use nimbus_platform::{Request, Response, ResponseType};

use crate::agent::{WorkerAgent, WorkerState};

/// What the fetch handler decided for one request
#[derive(Debug)]
#[must_use = "the dispatcher must route the decision back to the page"]
pub enum FetchDecision {
    /// Not intercepted; the browser performs the request untouched
    PassThrough,
    /// Respond with this response
    Respond(Response),
    /// The network failed and no fallback applies
    NoResponse,
}

impl FetchDecision {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchDecision::Respond(response) => Some(response),
            _ => None,
        }
    }
}

impl WorkerAgent {
    /// Intercept one fetch.
    ///
    /// Two overlapping fetches for the same URL may both miss and both
    /// write; the second write wins and stores an identical body, so the
    /// race is benign.
    pub fn handle_fetch(&mut self, request: &Request) -> FetchDecision {
        if self.state != WorkerState::Active {
            return FetchDecision::PassThrough;
        }
        // Foreign origins and API calls pass through untouched; caching an
        // API response would serve stale application state forever.
        if request.url.origin() != self.config.origin.origin() {
            return FetchDecision::PassThrough;
        }
        if request.url.path().contains(&self.config.api_marker) {
            return FetchDecision::PassThrough;
        }

        let key = request.url.to_string();
        if let Some(cached) = self
            .caches
            .get(&self.config.cache_name)
            .and_then(|cache| cache.match_url(&key))
        {
            return FetchDecision::Respond(cached.clone());
        }

        match self.network.fetch(request) {
            Ok(response) => {
                if response.status == 200 && response.response_type == ResponseType::Basic {
                    self.caches
                        .open(&self.config.cache_name)
                        .put(&key, response.clone());
                }
                FetchDecision::Respond(response)
            }
            Err(err) => {
                tracing::debug!(url = %key, %err, "network fetch failed");
                if request.is_navigation() {
                    if let Some(offline) = self.offline_fallback() {
                        return FetchDecision::Respond(offline);
                    }
                }
                FetchDecision::NoResponse
            }
        }
    }

    fn offline_fallback(&self) -> Option<Response> {
        let offline_url = self.config.asset_url(&self.config.offline_path).ok()?;
        self.caches
            .get(&self.config.cache_name)
            .and_then(|cache| cache.match_url(offline_url.as_str()))
            .cloned()
    }
}
