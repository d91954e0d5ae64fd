//! Worker Agent
//!
//! Lifecycle (install/activate), command messages, background sync and
//! subscription rotation. Fetch interception and push dispatch live in
//! their own modules as further `impl` blocks on [`WorkerAgent`].

use serde_json::Value;

use nimbus_api::{BackendApi, PushMessage, WorkerCommand};
use nimbus_platform::{
    CacheStorage, Network, NetworkError, NotificationDisplay, PushSubscription, Request,
    WindowClients,
};

use crate::config::WorkerConfig;

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
    Redundant,
}

/// Worker agent failure
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A precache asset could not be fetched; the whole install fails
    #[error("install failed fetching {url}: {source}")]
    InstallFetch {
        url: String,
        source: NetworkError,
    },
    /// A precache asset came back with a non-200 status
    #[error("install failed: {url} returned status {status}")]
    InstallStatus { url: String, status: u16 },
    /// A manifest path did not resolve against the origin
    #[error("invalid shell path {path}: {source}")]
    BadShellPath {
        path: String,
        source: url::ParseError,
    },
    /// Operation called in the wrong lifecycle state
    #[error("expected worker state {expected:?}, was {actual:?}")]
    InvalidState {
        expected: WorkerState,
        actual: WorkerState,
    },
    /// The host refused to display a push notification
    #[error(transparent)]
    Platform(#[from] nimbus_platform::PlatformError),
}

/// The service-worker-context agent
pub struct WorkerAgent {
    pub(crate) config: WorkerConfig,
    pub(crate) state: WorkerState,
    pub(crate) caches: CacheStorage,
    pub(crate) network: Box<dyn Network>,
    pub(crate) display: Box<dyn NotificationDisplay>,
    pub(crate) clients: Box<dyn WindowClients>,
    pub(crate) backend: Box<dyn BackendApi>,
    skip_waiting: bool,
    sync_hook: Option<Box<dyn FnMut()>>,
}

impl WorkerAgent {
    pub fn new(
        config: WorkerConfig,
        network: Box<dyn Network>,
        display: Box<dyn NotificationDisplay>,
        clients: Box<dyn WindowClients>,
        backend: Box<dyn BackendApi>,
    ) -> Self {
        let skip_waiting = config.skip_waiting;
        Self {
            config,
            state: WorkerState::Installing,
            caches: CacheStorage::new(),
            network,
            display,
            clients,
            backend,
            skip_waiting,
            sync_hook: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Cache names currently present, for the activation invariant
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.keys()
    }

    /// Seed a stale cache as left behind by a previous worker version
    pub fn adopt_stale_cache(&mut self, name: &str) {
        self.caches.open(name);
    }

    /// Register the hook run by a recognized background sync event
    pub fn set_sync_hook(&mut self, hook: Box<dyn FnMut()>) {
        self.sync_hook = Some(hook);
    }

    /// Install: fetch and store the whole shell manifest, all-or-nothing.
    ///
    /// Nothing is committed to the versioned cache until every asset has
    /// been fetched successfully; one failure makes this worker redundant
    /// so the next install attempt starts clean.
    pub fn install(&mut self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Installing)?;

        let mut staged: Vec<(String, nimbus_platform::Response)> = Vec::new();
        for path in self.config.install_manifest() {
            let url = self
                .config
                .asset_url(&path)
                .map_err(|source| WorkerError::BadShellPath {
                    path: path.clone(),
                    source,
                })?;
            let request = Request {
                url: url.clone(),
                mode: nimbus_platform::RequestMode::NoCors,
            };
            let response = match self.network.fetch(&request) {
                Ok(response) => response,
                Err(source) => {
                    self.state = WorkerState::Redundant;
                    return Err(WorkerError::InstallFetch {
                        url: url.to_string(),
                        source,
                    });
                }
            };
            if response.status != 200 {
                self.state = WorkerState::Redundant;
                return Err(WorkerError::InstallStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            staged.push((url.to_string(), response));
        }

        let cache = self.caches.open(&self.config.cache_name);
        for (url, response) in staged {
            cache.put(&url, response);
        }

        tracing::info!(cache = %self.config.cache_name, "shell cached, install complete");
        self.state = WorkerState::Waiting;
        Ok(())
    }

    /// Whether the install directive asked to skip the waiting phase
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    /// Activate: purge every cache not carrying the current version tag,
    /// then claim all open clients.
    pub fn activate(&mut self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Waiting)?;

        for name in self.caches.keys() {
            if name != self.config.cache_name {
                self.caches.delete(&name);
                tracing::debug!(cache = %name, "purged stale cache");
            }
        }
        self.clients.claim();
        self.state = WorkerState::Active;
        Ok(())
    }

    /// Handle a command message posted by a page.
    ///
    /// Unrecognized types are logged and ignored so older workers tolerate
    /// newer pages.
    pub fn handle_message(&mut self, message: &Value) {
        match WorkerCommand::parse(message) {
            WorkerCommand::SkipWaiting => {
                self.skip_waiting = true;
                if self.state == WorkerState::Waiting {
                    if let Err(err) = self.activate() {
                        tracing::warn!(%err, "skip-waiting activation failed");
                    }
                }
            }
            WorkerCommand::ClearCache => {
                self.caches.delete(&self.config.cache_name);
                tracing::info!(cache = %self.config.cache_name, "cache cleared by page command");
            }
            WorkerCommand::Unknown(kind) => {
                tracing::debug!(kind = kind.as_deref().unwrap_or("<missing>"), "ignoring unknown command");
            }
        }
    }

    /// Handle a background sync wakeup
    pub fn handle_sync(&mut self, tag: &str) -> bool {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return false;
        }
        tracing::debug!(tag, "running background refresh");
        if let Some(hook) = self.sync_hook.as_mut() {
            hook();
        }
        true
    }

    /// Handle the push service rotating the subscription underneath us.
    ///
    /// The only case where the worker talks to the backend itself: no page
    /// may be open when a rotation arrives. Best-effort; a failure is
    /// logged and dropped.
    pub fn handle_subscription_change(
        &self,
        old: Option<&PushSubscription>,
        new: Option<&PushSubscription>,
    ) {
        let Some(new_subscription) = new else {
            // The user unsubscribed; nothing to forward
            return;
        };
        let old_endpoint = old.map(|subscription| subscription.endpoint.as_str());
        if let Err(err) = self
            .backend
            .update_subscription(old_endpoint, new_subscription)
        {
            tracing::warn!(%err, "failed to forward rotated subscription");
        }
    }

    pub(crate) fn expect_state(&self, expected: WorkerState) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    pub(crate) fn parse_push(&self, data: Option<&[u8]>) -> PushMessage {
        match data {
            Some(bytes) => PushMessage::parse(bytes),
            None => PushMessage::Structured(nimbus_api::NotificationPayload {
                title: self.config.default_title.clone(),
                body: self.config.default_body.clone(),
                icon: None,
                image: None,
                data: None,
                actions: Vec::new(),
                tag: None,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use nimbus_api::FakeBackend;
    use nimbus_platform::{InMemoryClients, RecordingDisplay, Response, ScriptedNetwork};
    use url::Url;

    use super::*;

    pub(crate) struct Harness {
        pub agent: WorkerAgent,
        pub network: ScriptedNetwork,
        pub display: RecordingDisplay,
        pub clients: InMemoryClients,
        pub backend: FakeBackend,
    }

    /// Agent over in-memory seams with every shell asset routed
    pub(crate) fn harness() -> Harness {
        harness_with(WorkerConfig::new(Url::parse("https://app.example").unwrap()))
    }

    pub(crate) fn harness_with(config: WorkerConfig) -> Harness {
        let network = ScriptedNetwork::new();
        for path in config.install_manifest() {
            let url = config.asset_url(&path).unwrap();
            network.route(url.as_str(), Response::ok("text/html", path.clone().into_bytes()));
        }
        let display = RecordingDisplay::new();
        let clients = InMemoryClients::new();
        let backend = FakeBackend::new("BKey");
        let agent = WorkerAgent::new(
            config,
            Box::new(network.clone()),
            Box::new(display.clone()),
            Box::new(clients.clone()),
            Box::new(backend.clone()),
        );
        Harness {
            agent,
            network,
            display,
            clients,
            backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use nimbus_platform::{PushSubscription, SubscriptionKeys};

    use super::testutil::harness;
    use super::*;

    fn subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: "pk".to_string(),
                auth: "ak".to_string(),
            },
        }
    }

    #[test]
    fn test_install_caches_whole_manifest() {
        let mut h = harness();
        h.agent.install().unwrap();

        assert_eq!(h.agent.state(), WorkerState::Waiting);
        let cached = h.agent.caches.get("nimbus-v1").unwrap();
        assert_eq!(cached.len(), h.agent.config.install_manifest().len());
    }

    #[test]
    fn test_install_is_all_or_nothing() {
        let mut h = harness();
        h.network.set_offline(true);
        let err = h.agent.install().unwrap_err();

        assert!(matches!(err, WorkerError::InstallFetch { .. }));
        assert_eq!(h.agent.state(), WorkerState::Redundant);
        assert!(h.agent.cache_names().is_empty());
    }

    #[test]
    fn test_install_rejects_bad_status() {
        let mut h = harness();
        h.network.route(
            "https://app.example/static/js/main.js",
            nimbus_platform::Response::not_found(),
        );
        let err = h.agent.install().unwrap_err();
        assert!(matches!(err, WorkerError::InstallStatus { status: 404, .. }));
        assert!(h.agent.cache_names().is_empty());
    }

    #[test]
    fn test_activate_purges_stale_caches_and_claims() {
        let mut h = harness();
        h.agent.adopt_stale_cache("nimbus-v0");
        h.agent.install().unwrap();
        h.agent.activate().unwrap();

        assert_eq!(h.agent.state(), WorkerState::Active);
        assert_eq!(h.agent.cache_names(), vec!["nimbus-v1".to_string()]);
        assert!(h.clients.claimed());
    }

    #[test]
    fn test_activate_requires_waiting() {
        let mut h = harness();
        assert!(matches!(
            h.agent.activate(),
            Err(WorkerError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_skip_waiting_message_activates() {
        let mut h = harness();
        h.agent.install().unwrap();
        h.agent
            .handle_message(&serde_json::json!({"type": "SKIP_WAITING"}));
        assert_eq!(h.agent.state(), WorkerState::Active);
    }

    #[test]
    fn test_clear_cache_message() {
        let mut h = harness();
        h.agent.install().unwrap();
        h.agent
            .handle_message(&serde_json::json!({"type": "CLEAR_CACHE"}));
        assert!(h.agent.cache_names().is_empty());
    }

    #[test]
    fn test_unknown_message_is_ignored() {
        let mut h = harness();
        h.agent.install().unwrap();
        h.agent.handle_message(&serde_json::json!({"type": "DEFRAG"}));
        h.agent.handle_message(&serde_json::json!({"other": true}));
        // State and cache untouched
        assert_eq!(h.agent.state(), WorkerState::Waiting);
        assert_eq!(h.agent.cache_names(), vec!["nimbus-v1".to_string()]);
    }

    #[test]
    fn test_sync_runs_hook_for_known_tag_only() {
        let mut h = harness();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        h.agent
            .set_sync_hook(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        assert!(h.agent.handle_sync("sync-articles"));
        assert!(!h.agent.handle_sync("sync-somethingelse"));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_change_forwards_old_and_new() {
        let h = harness();
        let old = subscription("https://push.example.net/send/old");
        let new = subscription("https://push.example.net/send/new");
        h.agent.handle_subscription_change(Some(&old), Some(&new));

        let updates = h.backend.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].0.as_deref(),
            Some("https://push.example.net/send/old")
        );
        assert_eq!(updates[0].1.endpoint, "https://push.example.net/send/new");
    }

    #[test]
    fn test_subscription_change_without_new_is_noop() {
        let h = harness();
        let old = subscription("https://push.example.net/send/old");
        h.agent.handle_subscription_change(Some(&old), None);
        assert!(h.backend.updates().is_empty());
    }

    #[test]
    fn test_subscription_change_swallows_backend_failure() {
        let h = harness();
        h.backend.fail_updates();
        let new = subscription("https://push.example.net/send/new");
        // Must not panic or surface anything
        h.agent.handle_subscription_change(None, Some(&new));
        assert!(h.backend.updates().is_empty());
    }
}
