//! nimbus demo
//!
//! Wires the page controller and the worker agent against the in-memory
//! platform and walks the full push lifecycle: register, subscribe,
//! install, activate, fetch offline, receive a push, click it.

use anyhow::Result;
use url::Url;

use nimbus_api::FakeBackend;
use nimbus_client::{ClientConfig, SubscriptionController};
use nimbus_platform::{
    Capabilities, InMemoryClients, InMemoryPermission, InMemoryPushService, InMemoryWorkerHost,
    RecordingDisplay, Request, Response, ScriptedNetwork,
};
use nimbus_worker::{FetchDecision, NotificationClick, WorkerAgent, WorkerConfig};

// A demo application server key: 87 url-safe chars, 65 raw bytes
fn demo_public_key() -> String {
    "B".repeat(87)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let backend = FakeBackend::new(&demo_public_key());
    let display = RecordingDisplay::new();

    // Page context: register the worker and subscribe
    let mut controller = SubscriptionController::new(
        ClientConfig::default(),
        Capabilities::full(),
        Box::new(InMemoryPushService::new()),
        Box::new(InMemoryPermission::granting()),
        Box::new(InMemoryWorkerHost::new()),
        Box::new(backend.clone()),
        Box::new(display.clone()),
    );
    tracing::info!(state = controller.initialize().as_str(), "page initialized");
    tracing::info!(state = controller.subscribe().as_str(), "subscribed");

    // Worker context: install the shell and take over
    let config = WorkerConfig::new(Url::parse("https://app.example")?);
    let network = ScriptedNetwork::new();
    for path in config.install_manifest() {
        let url = config.asset_url(&path)?;
        network.route(
            url.as_str(),
            Response::ok("text/html", format!("<!-- {path} -->").into_bytes()),
        );
    }
    let clients = InMemoryClients::new();
    let mut agent = WorkerAgent::new(
        config,
        Box::new(network.clone()),
        Box::new(display.clone()),
        Box::new(clients.clone()),
        Box::new(backend.clone()),
    );
    agent.install()?;
    agent.activate()?;
    tracing::info!(caches = ?agent.cache_names(), "worker active");

    // Offline navigation falls back to the cached offline page
    network.set_offline(true);
    let navigation = Request::navigate("https://app.example/feed")?;
    match agent.handle_fetch(&navigation) {
        FetchDecision::Respond(response) => {
            tracing::info!(status = response.status, "offline navigation served from cache");
        }
        decision => tracing::warn!(?decision, "unexpected fetch decision"),
    }
    network.set_offline(false);

    // A push arrives and gets clicked
    let payload = serde_json::json!({
        "title": "Welcome to Nimbus",
        "body": "Push notifications are live",
        "data": {"url": "/articles/1/"}
    });
    let shown = agent.handle_push(Some(payload.to_string().as_bytes()))?;
    tracing::info!(title = %shown.title, "push displayed");

    let click = NotificationClick {
        tag: shown.options.tag.clone(),
        action: None,
        data: shown.options.data.clone(),
    };
    let outcome = agent.handle_notification_click(&click)?;
    tracing::info!(?outcome, windows = clients.windows_opened(), "click routed");

    tracing::info!(state = controller.unsubscribe().as_str(), "unsubscribed");
    Ok(())
}
