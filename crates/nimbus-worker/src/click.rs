//! Notification Clicks
//!
//! Closing the clicked notification and steering the user to the right
//! page: focus an existing window showing the target URL, otherwise open
//! a new one. Action-button clicks are recorded but not yet routed.

use serde_json::Value;

use nimbus_platform::{ClientId, PlatformError};

use crate::agent::WorkerAgent;

/// A click on a displayed notification
#[derive(Debug, Clone, Default)]
pub struct NotificationClick {
    /// Tag of the clicked notification, used to close it
    pub tag: Option<String>,
    /// Action button identifier, when a button was hit instead of the body
    pub action: Option<String>,
    /// The `data` the notification was displayed with
    pub data: Option<Value>,
}

/// Where a click ended up
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the dispatcher should know which window handled the click"]
pub enum ClickOutcome {
    /// An action button was clicked; recorded, no navigation
    ActionLogged(String),
    /// An existing window already showed the target and was focused
    Focused(ClientId),
    /// A new window was opened at the target URL
    Opened(ClientId),
}

impl WorkerAgent {
    /// Handle a notification click.
    ///
    /// The notification is closed first so it never outlives the click,
    /// whatever happens with navigation afterwards.
    pub fn handle_notification_click(
        &self,
        click: &NotificationClick,
    ) -> Result<ClickOutcome, PlatformError> {
        if let Some(tag) = &click.tag {
            self.display.close(tag);
        }

        if let Some(action) = &click.action {
            tracing::debug!(action, "notification action clicked");
            return Ok(ClickOutcome::ActionLogged(action.clone()));
        }

        let target = click
            .data
            .as_ref()
            .and_then(|data| data.get("url"))
            .and_then(Value::as_str)
            .unwrap_or("/")
            .to_string();

        for client in self.clients.list() {
            if client.url == target && self.clients.focus(client.id) {
                return Ok(ClickOutcome::Focused(client.id));
            }
        }
        let opened = self.clients.open_window(&target)?;
        Ok(ClickOutcome::Opened(opened.id))
    }
}
