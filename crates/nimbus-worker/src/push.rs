//! Push Dispatch
//!
//! Turns an incoming push event into one displayed notification. Payloads
//! that do not parse as structured JSON are still shown, as raw text under
//! the default title, so a delivery is never silently dropped.

use nimbus_api::PushMessage;
use nimbus_platform::{Notification, NotificationAction, NotificationOptions};

use crate::agent::{WorkerAgent, WorkerError};

impl WorkerAgent {
    /// Handle a push event: build the notification and display it.
    ///
    /// Returns the notification as displayed. The only failure is the host
    /// refusing to show it.
    pub fn handle_push(&self, data: Option<&[u8]>) -> Result<Notification, WorkerError> {
        let notification = match self.parse_push(data) {
            PushMessage::Structured(payload) => Notification {
                title: payload.title,
                options: NotificationOptions {
                    body: Some(payload.body),
                    icon: Some(
                        payload
                            .icon
                            .unwrap_or_else(|| self.config.default_icon.clone()),
                    ),
                    badge: Some(self.config.badge_icon.clone()),
                    image: payload.image,
                    tag: Some(
                        payload
                            .tag
                            .unwrap_or_else(|| self.config.default_tag.clone()),
                    ),
                    data: payload.data,
                    vibrate: self.config.vibration.clone(),
                    actions: payload
                        .actions
                        .into_iter()
                        .map(|action| NotificationAction {
                            action: action.action,
                            title: action.title,
                            icon: action.icon,
                        })
                        .collect(),
                },
            },
            PushMessage::Raw(text) => Notification {
                title: self.config.default_title.clone(),
                options: NotificationOptions {
                    body: Some(text),
                    icon: Some(self.config.default_icon.clone()),
                    badge: Some(self.config.badge_icon.clone()),
                    image: None,
                    tag: Some(self.config.default_tag.clone()),
                    data: None,
                    vibrate: self.config.vibration.clone(),
                    actions: Vec::new(),
                },
            },
        };

        tracing::debug!(title = %notification.title, "displaying push notification");
        self.display.show(&notification)?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::super::agent::testutil::harness;
    use super::*;

    #[test]
    fn test_structured_payload_fills_defaults() {
        let h = harness();
        let shown = h
            .agent
            .handle_push(Some(br#"{"title":"Breaking","body":"It happened"}"#))
            .unwrap();

        assert_eq!(shown.title, "Breaking");
        assert_eq!(shown.options.body.as_deref(), Some("It happened"));
        assert_eq!(
            shown.options.icon.as_deref(),
            Some("/static/images/icon-192.png")
        );
        assert_eq!(shown.options.tag.as_deref(), Some("nimbus-notification"));
        assert_eq!(shown.options.vibrate, vec![200, 100, 200, 100, 200, 100, 200]);
        assert_eq!(h.display.visible().len(), 1);
    }

    #[test]
    fn test_payload_fields_override_defaults() {
        let h = harness();
        let payload = br#"{"title":"T","body":"B","icon":"/i.png","tag":"article-7",
            "data":{"url":"/articles/7/"},
            "actions":[{"action":"open","title":"Read"}]}"#;
        let shown = h.agent.handle_push(Some(payload)).unwrap();

        assert_eq!(shown.options.icon.as_deref(), Some("/i.png"));
        assert_eq!(shown.options.tag.as_deref(), Some("article-7"));
        assert_eq!(shown.options.data.unwrap()["url"], "/articles/7/");
        assert_eq!(shown.options.actions.len(), 1);
        assert_eq!(shown.options.actions[0].action, "open");
    }

    #[test]
    fn test_unparseable_payload_shown_raw() {
        let h = harness();
        let shown = h.agent.handle_push(Some(b"server restarting at noon")).unwrap();

        assert_eq!(shown.title, "Nimbus");
        assert_eq!(
            shown.options.body.as_deref(),
            Some("server restarting at noon")
        );
        assert_eq!(h.display.visible().len(), 1);
    }

    #[test]
    fn test_empty_push_uses_generic_notification() {
        let h = harness();
        let shown = h.agent.handle_push(None).unwrap();

        assert_eq!(shown.title, "Nimbus");
        assert_eq!(
            shown.options.body.as_deref(),
            Some("You have a new notification")
        );
    }

    #[test]
    fn test_same_tag_coalesces() {
        let h = harness();
        h.agent
            .handle_push(Some(br#"{"title":"first","body":"1"}"#))
            .unwrap();
        h.agent
            .handle_push(Some(br#"{"title":"second","body":"2"}"#))
            .unwrap();

        let visible = h.display.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "second");
    }

    #[test]
    fn test_display_failure_propagates() {
        let h = harness();
        h.display.fail_next();
        let err = h
            .agent
            .handle_push(Some(br#"{"title":"T","body":"B"}"#))
            .unwrap_err();
        assert!(matches!(err, WorkerError::Platform(_)));
    }
}
