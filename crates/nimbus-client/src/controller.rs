//! Subscription Controller
//!
//! The page-side state machine driving subscribe, unsubscribe and status
//! checks against the injected platform and backend seams. Every operation
//! leaves the UI in exactly one state and re-derives `is_subscribed` from
//! the platform's actual subscription object, never from its own memory.

use nimbus_api::{BackendApi, BackendError, NotificationPayload};
use nimbus_platform::{
    decode_server_key, Capabilities, KeyDecodeError, Notification, NotificationDisplay,
    NotificationOptions, PermissionPrompt, PermissionState, PlatformError, PushService, WorkerHost,
};

use crate::config::ClientConfig;
use crate::inbox::NotificationInbox;
use crate::toast::ToastManager;
use crate::ui::UiState;

/// Why a controller operation failed, before it is surfaced as a toast
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Key(#[from] KeyDecodeError),
}

/// Page-context controller for the push subscription
pub struct SubscriptionController {
    config: ClientConfig,
    capabilities: Capabilities,
    push: Box<dyn PushService>,
    permission: Box<dyn PermissionPrompt>,
    host: Box<dyn WorkerHost>,
    backend: Box<dyn BackendApi>,
    display: Box<dyn NotificationDisplay>,
    state: UiState,
    is_subscribed: bool,
    toasts: ToastManager,
    inbox: NotificationInbox,
}

impl SubscriptionController {
    pub fn new(
        config: ClientConfig,
        capabilities: Capabilities,
        push: Box<dyn PushService>,
        permission: Box<dyn PermissionPrompt>,
        host: Box<dyn WorkerHost>,
        backend: Box<dyn BackendApi>,
        display: Box<dyn NotificationDisplay>,
    ) -> Self {
        Self {
            config,
            capabilities,
            push,
            permission,
            host,
            backend,
            display,
            state: UiState::Unsubscribed,
            is_subscribed: false,
            toasts: ToastManager::new(),
            inbox: NotificationInbox::new(),
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastManager {
        &mut self.toasts
    }

    pub fn inbox(&self) -> &NotificationInbox {
        &self.inbox
    }

    /// Unread badge count
    pub fn unread_count(&self) -> usize {
        self.inbox.unread_count()
    }

    /// Startup: feature-detect, register the worker, check the current
    /// subscription. An unsupported host is terminal and touches nothing.
    pub fn initialize(&mut self) -> UiState {
        if !self.capabilities.push_supported() {
            tracing::info!("push not supported on this host");
            self.state = UiState::Unsupported;
            return self.state;
        }
        if let Err(err) = self.host.register(&self.config.worker_script) {
            tracing::warn!(%err, "worker registration failed");
            self.toasts.error("Could not register the service worker");
            self.state = UiState::Error;
            return self.state;
        }
        self.check_subscription_status()
    }

    /// Reconcile the UI with the platform's subscription, verifying a held
    /// subscription against the backend.
    ///
    /// A subscription the backend no longer recognizes is dropped on the
    /// spot, platform side first, so the next subscribe starts clean.
    pub fn check_subscription_status(&mut self) -> UiState {
        let Some(subscription) = self.push.subscription() else {
            self.is_subscribed = false;
            self.state = match self.permission.state() {
                PermissionState::Denied => UiState::PermissionDenied,
                _ => UiState::Unsubscribed,
            };
            return self.state;
        };

        match self.backend.verify_subscription(&subscription.endpoint) {
            Ok(true) => {
                self.is_subscribed = true;
                self.state = UiState::Subscribed;
            }
            Ok(false) => {
                tracing::info!(endpoint = %subscription.endpoint, "subscription no longer recognized");
                self.push.unsubscribe();
                if let Err(err) = self.backend.remove_subscription(&subscription.endpoint) {
                    tracing::debug!(%err, "cleanup remove failed");
                }
                self.is_subscribed = false;
                self.state = UiState::Unsubscribed;
            }
            Err(err) => {
                // Could not reach the backend; trust the platform's object
                tracing::warn!(%err, "subscription verify failed");
                self.is_subscribed = true;
                self.state = UiState::Subscribed;
            }
        }
        self.state
    }

    /// Subscribe: prompt, fetch and decode the server key, create the
    /// subscription, persist it. Any failure leaves `is_subscribed` false
    /// and nothing half-done.
    pub fn subscribe(&mut self) -> UiState {
        if !self.capabilities.push_supported() {
            self.state = UiState::Unsupported;
            return self.state;
        }
        self.state = UiState::Loading;

        match self.permission.request() {
            PermissionState::Granted => {}
            _ => {
                self.toasts.warning("Notifications are blocked in browser settings");
                self.state = UiState::PermissionDenied;
                return self.state;
            }
        }

        match self.create_and_save_subscription() {
            Ok(()) => {
                self.is_subscribed = true;
                self.toasts.success("Notifications enabled");
                self.state = UiState::Subscribed;
            }
            Err(err) => {
                tracing::warn!(%err, "subscribe failed");
                self.is_subscribed = false;
                self.toasts.error("Could not enable notifications");
                self.state = UiState::Error;
            }
        }
        self.state
    }

    fn create_and_save_subscription(&mut self) -> Result<(), ClientError> {
        let encoded = self.backend.public_key()?;
        let key = decode_server_key(&encoded)?;
        let subscription = self.push.subscribe(&key)?;
        if let Err(err) = self.backend.save_subscription(&subscription) {
            // The backend never saw it; drop the platform half too
            self.push.unsubscribe();
            return Err(err.into());
        }
        Ok(())
    }

    /// Unsubscribe: platform first, then the backend record. Holding no
    /// subscription already counts as success.
    pub fn unsubscribe(&mut self) -> UiState {
        self.state = UiState::Loading;

        let Some(subscription) = self.push.subscription() else {
            self.is_subscribed = false;
            self.state = UiState::Unsubscribed;
            return self.state;
        };

        self.push.unsubscribe();
        match self.backend.remove_subscription(&subscription.endpoint) {
            Ok(()) => {
                self.is_subscribed = false;
                self.toasts.success("Notifications disabled");
                self.state = UiState::Unsubscribed;
            }
            Err(err) => {
                tracing::warn!(%err, "unsubscribe failed");
                self.toasts.error("Could not disable notifications");
                self.state = UiState::Error;
            }
        }
        self.state
    }

    /// Display a payload relayed from the worker while this page is open.
    /// Shown only under granted permission; returns whether it was shown.
    pub fn relay_push(&mut self, payload: &NotificationPayload) -> bool {
        if self.permission.state() != PermissionState::Granted {
            return false;
        }
        let notification = Notification {
            title: payload.title.clone(),
            options: NotificationOptions {
                body: Some(payload.body.clone()),
                icon: Some(
                    payload
                        .icon
                        .clone()
                        .unwrap_or_else(|| self.config.default_icon.clone()),
                ),
                tag: Some(
                    payload
                        .tag
                        .clone()
                        .unwrap_or_else(|| self.config.default_tag.clone()),
                ),
                data: payload.data.clone(),
                ..Default::default()
            },
        };
        match self.display.show(&notification) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "foreground display failed");
                false
            }
        }
    }

    /// Record an arrived notification in the inbox
    pub fn receive_notification(&mut self, id: u64, title: &str, body: &str) {
        self.inbox.push(id, title, body);
    }

    /// Mark one inbox item read; the list changes only if the backend
    /// accepted the call.
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.backend.mark_read(id) {
            Ok(()) => self.inbox.mark_read(id),
            Err(err) => {
                tracing::warn!(%err, id, "mark-read failed");
                self.toasts.error("Could not update the notification");
                false
            }
        }
    }

    /// Mark the whole inbox read
    pub fn mark_all_read(&mut self) -> bool {
        match self.backend.mark_all_read() {
            Ok(()) => {
                self.inbox.mark_all_read();
                self.toasts.success("All notifications marked as read");
                true
            }
            Err(err) => {
                tracing::warn!(%err, "mark-all-read failed");
                self.toasts.error("Could not mark notifications as read");
                false
            }
        }
    }

    /// Delete one inbox item
    pub fn delete_notification(&mut self, id: u64) -> bool {
        match self.backend.delete_notification(id) {
            Ok(()) => self.inbox.remove(id),
            Err(err) => {
                tracing::warn!(%err, id, "delete failed");
                self.toasts.error("Could not delete the notification");
                false
            }
        }
    }
}
