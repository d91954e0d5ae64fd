//! Client Configuration

/// Static configuration for the subscription controller
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Worker script URL passed to registration
    pub worker_script: String,
    /// Title for notifications relayed while a page is open
    pub default_title: String,
    /// Icon for relayed notifications
    pub default_icon: String,
    /// Coalescing tag for relayed notifications
    pub default_tag: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            worker_script: "/sw.js".to_string(),
            default_title: "Nimbus".to_string(),
            default_icon: "/static/images/icon-192.png".to_string(),
            default_tag: "nimbus-notification".to_string(),
        }
    }
}
