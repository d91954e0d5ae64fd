//! Worker Configuration
//!
//! The cache version tag, precache manifest and notification defaults.
//! Bumping `cache_name` is how a deploy invalidates the previous shell;
//! activation purges every cache that does not carry the current tag.

use url::Url;

/// Static configuration for the worker agent
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Origin this worker serves; foreign origins are never intercepted
    pub origin: Url,
    /// Current cache version tag
    pub cache_name: String,
    /// Shell asset paths fetched and stored at install time
    pub precache: Vec<String>,
    /// Offline fallback page, cached at install time
    pub offline_path: String,
    /// Path segment marking backend API calls; never cached or rewritten
    pub api_marker: String,
    /// Title used when a push payload has none
    pub default_title: String,
    /// Body used when a push event carries no data at all
    pub default_body: String,
    /// Icon used when a payload has none
    pub default_icon: String,
    /// Monochrome badge asset
    pub badge_icon: String,
    /// Coalescing tag so rapid pushes replace instead of stack
    pub default_tag: String,
    /// Vibration pattern for displayed notifications
    pub vibration: Vec<u32>,
    /// Background sync tag the refresh hook answers to
    pub sync_tag: String,
    /// Skip the waiting phase after a successful install
    pub skip_waiting: bool,
}

impl WorkerConfig {
    /// Defaults for an origin
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            cache_name: "nimbus-v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/static/css/styles.css".to_string(),
                "/static/js/main.js".to_string(),
                "/static/images/icon-192.png".to_string(),
                "/static/images/icon-512.png".to_string(),
            ],
            offline_path: "/offline/".to_string(),
            api_marker: "/api/".to_string(),
            default_title: "Nimbus".to_string(),
            default_body: "You have a new notification".to_string(),
            default_icon: "/static/images/icon-192.png".to_string(),
            badge_icon: "/static/images/icon-192.png".to_string(),
            default_tag: "nimbus-notification".to_string(),
            vibration: vec![200, 100, 200, 100, 200, 100, 200],
            sync_tag: "sync-articles".to_string(),
            skip_waiting: true,
        }
    }

    /// Absolute URL for a shell path
    pub fn asset_url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.origin.join(path)
    }

    /// Every URL the install step must store, offline page included
    pub fn install_manifest(&self) -> Vec<String> {
        let mut manifest = self.precache.clone();
        if !manifest.contains(&self.offline_path) {
            manifest.push(self.offline_path.clone());
        }
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_includes_offline_page() {
        let config = WorkerConfig::new(Url::parse("https://app.example").unwrap());
        let manifest = config.install_manifest();
        assert!(manifest.contains(&"/offline/".to_string()));
        assert!(manifest.contains(&"/".to_string()));
    }

    #[test]
    fn test_asset_url_joins_origin() {
        let config = WorkerConfig::new(Url::parse("https://app.example").unwrap());
        let url = config.asset_url("/static/js/main.js").unwrap();
        assert_eq!(url.as_str(), "https://app.example/static/js/main.js");
    }
}
