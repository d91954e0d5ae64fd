//! Backend Contract
//!
//! The `BackendApi` trait both agents call, a blocking HTTP adapter, and a
//! recording fake. The backend mirrors subscriptions keyed by endpoint; it
//! never owns them.

use std::sync::{Arc, Mutex};

use url::Url;

use nimbus_platform::PushSubscription;

use crate::csrf::{read_cookie, CSRF_COOKIE, CSRF_HEADER};
use crate::wire::{EndpointMessage, SubscriptionChangeMessage};

/// Backend call failure
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid backend URL: {0}")]
    BadUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

/// Operations the backend exposes to the client and the worker
pub trait BackendApi {
    /// VAPID public key as URL-safe base64 (GET, raw text body)
    fn public_key(&self) -> Result<String, BackendError>;

    /// Persist a new subscription
    fn save_subscription(&self, subscription: &PushSubscription) -> Result<(), BackendError>;

    /// Delete the record for an endpoint
    fn remove_subscription(&self, endpoint: &str) -> Result<(), BackendError>;

    /// Whether the backend still recognizes an endpoint
    fn verify_subscription(&self, endpoint: &str) -> Result<bool, BackendError>;

    /// Replace a rotated subscription, correlated by the old endpoint
    fn update_subscription(
        &self,
        old_endpoint: Option<&str>,
        new_subscription: &PushSubscription,
    ) -> Result<(), BackendError>;

    /// Mark one stored notification read
    fn mark_read(&self, notification_id: u64) -> Result<(), BackendError>;

    /// Mark every stored notification read
    fn mark_all_read(&self) -> Result<(), BackendError>;

    /// Delete one stored notification
    fn delete_notification(&self, notification_id: u64) -> Result<(), BackendError>;
}

/// Backend endpoint paths
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub public_key: String,
    pub subscribe: String,
    pub unsubscribe: String,
    pub verify: String,
    pub update_subscription: String,
    pub mark_all_read: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            public_key: "/api/push/public-key/".to_string(),
            subscribe: "/api/push/subscribe/".to_string(),
            unsubscribe: "/api/push/unsubscribe/".to_string(),
            verify: "/api/push/verify/".to_string(),
            update_subscription: "/api/push/update-subscription/".to_string(),
            mark_all_read: "/notifications/mark-all-read/".to_string(),
        }
    }
}

impl Endpoints {
    fn mark_read(&self, notification_id: u64) -> String {
        format!("/notifications/{notification_id}/read/")
    }

    fn notification(&self, notification_id: u64) -> String {
        format!("/notifications/{notification_id}/")
    }
}

/// Blocking HTTP adapter over `reqwest`
pub struct HttpBackend {
    base: Url,
    endpoints: Endpoints,
    client: reqwest::blocking::Client,
    csrf_token: Option<String>,
}

impl HttpBackend {
    /// Build an adapter for `base` with the session's cookie string
    pub fn new(base: &str, cookies: &str) -> Result<Self, BackendError> {
        Ok(Self {
            base: Url::parse(base)?,
            endpoints: Endpoints::default(),
            client: reqwest::blocking::Client::new(),
            csrf_token: read_cookie(cookies, CSRF_COOKIE),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn join(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base.join(path)?)
    }

    /// POST JSON with the CSRF token echoed in a header
    fn post_json<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        tracing::debug!(path, "backend POST");
        let mut request = self.client.post(self.join(path)?).json(body);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        Ok(request.send()?)
    }

    fn expect_ok(response: reqwest::blocking::Response) -> Result<(), BackendError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(response.status().as_u16()))
        }
    }
}

impl BackendApi for HttpBackend {
    fn public_key(&self) -> Result<String, BackendError> {
        let response = self.client.get(self.join(&self.endpoints.public_key)?).send()?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(response.text()?.trim().to_string())
    }

    fn save_subscription(&self, subscription: &PushSubscription) -> Result<(), BackendError> {
        Self::expect_ok(self.post_json(&self.endpoints.subscribe, subscription)?)
    }

    fn remove_subscription(&self, endpoint: &str) -> Result<(), BackendError> {
        let body = EndpointMessage {
            endpoint: endpoint.to_string(),
        };
        Self::expect_ok(self.post_json(&self.endpoints.unsubscribe, &body)?)
    }

    fn verify_subscription(&self, endpoint: &str) -> Result<bool, BackendError> {
        let body = EndpointMessage {
            endpoint: endpoint.to_string(),
        };
        // Any unsuccessful status means "not recognized", not a hard error;
        // the caller self-heals by unsubscribing.
        let response = self.post_json(&self.endpoints.verify, &body)?;
        Ok(response.status().is_success())
    }

    fn update_subscription(
        &self,
        old_endpoint: Option<&str>,
        new_subscription: &PushSubscription,
    ) -> Result<(), BackendError> {
        let body = SubscriptionChangeMessage {
            old_endpoint: old_endpoint.map(str::to_string),
            new_subscription: new_subscription.clone(),
        };
        Self::expect_ok(self.post_json(&self.endpoints.update_subscription, &body)?)
    }

    fn mark_read(&self, notification_id: u64) -> Result<(), BackendError> {
        let path = self.endpoints.mark_read(notification_id);
        Self::expect_ok(self.post_json(&path, &serde_json::json!({}))?)
    }

    fn mark_all_read(&self) -> Result<(), BackendError> {
        Self::expect_ok(self.post_json(&self.endpoints.mark_all_read, &serde_json::json!({}))?)
    }

    fn delete_notification(&self, notification_id: u64) -> Result<(), BackendError> {
        let url = self.join(&self.endpoints.notification(notification_id))?;
        let mut request = self.client.delete(url);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        Self::expect_ok(request.send()?)
    }
}

/// Recording fake backend
#[derive(Clone)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeInner>>,
}

struct FakeInner {
    public_key: String,
    verify_ok: bool,
    fail_saves: bool,
    fail_removes: bool,
    fail_updates: bool,
    fail_notification_ops: bool,
    saved: Vec<PushSubscription>,
    removed: Vec<String>,
    verify_calls: u32,
    updates: Vec<(Option<String>, PushSubscription)>,
    read_ids: Vec<u64>,
    deleted_ids: Vec<u64>,
    mark_all_calls: u32,
}

impl FakeBackend {
    /// Fake with a given URL-safe public key; verify succeeds by default
    pub fn new(public_key: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInner {
                public_key: public_key.to_string(),
                verify_ok: true,
                fail_saves: false,
                fail_removes: false,
                fail_updates: false,
                fail_notification_ops: false,
                saved: Vec::new(),
                removed: Vec::new(),
                verify_calls: 0,
                updates: Vec::new(),
                read_ids: Vec::new(),
                deleted_ids: Vec::new(),
                mark_all_calls: 0,
            })),
        }
    }

    pub fn reject_verifies(&self) {
        self.inner.lock().unwrap().verify_ok = false;
    }

    pub fn fail_saves(&self) {
        self.inner.lock().unwrap().fail_saves = true;
    }

    pub fn fail_removes(&self) {
        self.inner.lock().unwrap().fail_removes = true;
    }

    pub fn fail_updates(&self) {
        self.inner.lock().unwrap().fail_updates = true;
    }

    pub fn fail_notification_ops(&self) {
        self.inner.lock().unwrap().fail_notification_ops = true;
    }

    pub fn saved(&self) -> Vec<PushSubscription> {
        self.inner.lock().unwrap().saved.clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.inner.lock().unwrap().removed.clone()
    }

    pub fn verify_calls(&self) -> u32 {
        self.inner.lock().unwrap().verify_calls
    }

    pub fn updates(&self) -> Vec<(Option<String>, PushSubscription)> {
        self.inner.lock().unwrap().updates.clone()
    }

    pub fn read_ids(&self) -> Vec<u64> {
        self.inner.lock().unwrap().read_ids.clone()
    }

    pub fn deleted_ids(&self) -> Vec<u64> {
        self.inner.lock().unwrap().deleted_ids.clone()
    }

    pub fn mark_all_calls(&self) -> u32 {
        self.inner.lock().unwrap().mark_all_calls
    }
}

impl BackendApi for FakeBackend {
    fn public_key(&self) -> Result<String, BackendError> {
        Ok(self.inner.lock().unwrap().public_key.clone())
    }

    fn save_subscription(&self, subscription: &PushSubscription) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_saves {
            return Err(BackendError::Status(500));
        }
        inner.saved.push(subscription.clone());
        Ok(())
    }

    fn remove_subscription(&self, endpoint: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_removes {
            return Err(BackendError::Status(500));
        }
        inner.removed.push(endpoint.to_string());
        Ok(())
    }

    fn verify_subscription(&self, _endpoint: &str) -> Result<bool, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.verify_calls += 1;
        Ok(inner.verify_ok)
    }

    fn update_subscription(
        &self,
        old_endpoint: Option<&str>,
        new_subscription: &PushSubscription,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_updates {
            return Err(BackendError::Status(502));
        }
        inner
            .updates
            .push((old_endpoint.map(str::to_string), new_subscription.clone()));
        Ok(())
    }

    fn mark_read(&self, notification_id: u64) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_notification_ops {
            return Err(BackendError::Status(500));
        }
        inner.read_ids.push(notification_id);
        Ok(())
    }

    fn mark_all_read(&self) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_notification_ops {
            return Err(BackendError::Status(500));
        }
        inner.mark_all_calls += 1;
        Ok(())
    }

    fn delete_notification(&self, notification_id: u64) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_notification_ops {
            return Err(BackendError::Status(500));
        }
        inner.deleted_ids.push(notification_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_platform::SubscriptionKeys;

    fn subscription() -> PushSubscription {
        PushSubscription {
            endpoint: "https://push.example.net/send/1".to_string(),
            keys: SubscriptionKeys {
                p256dh: "pk".to_string(),
                auth: "ak".to_string(),
            },
        }
    }

    #[test]
    fn test_fake_records_calls() {
        let backend = FakeBackend::new("BKey");
        backend.save_subscription(&subscription()).unwrap();
        backend.remove_subscription("ep").unwrap();
        assert!(backend.verify_subscription("ep").unwrap());

        assert_eq!(backend.saved().len(), 1);
        assert_eq!(backend.removed(), vec!["ep".to_string()]);
        assert_eq!(backend.verify_calls(), 1);
    }

    #[test]
    fn test_fake_rejects_when_configured() {
        let backend = FakeBackend::new("BKey");
        backend.reject_verifies();
        assert!(!backend.verify_subscription("ep").unwrap());

        backend.fail_saves();
        assert!(backend.save_subscription(&subscription()).is_err());
    }

    #[test]
    fn test_endpoint_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.mark_read(7), "/notifications/7/read/");
        assert_eq!(endpoints.notification(7), "/notifications/7/");
        assert!(endpoints.public_key.starts_with("/api/push/"));
    }
}
