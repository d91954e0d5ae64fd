//! OS Notifications
//!
//! Display model for notifications shown by the worker, and the display
//! seam. A notification's tag de-duplicates: showing a second notification
//! with the same tag replaces the first instead of stacking.

use std::sync::{Arc, Mutex};

use crate::error::PlatformError;

/// A notification ready to display
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

/// Notification options
#[derive(Debug, Clone, Default)]
pub struct NotificationOptions {
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub image: Option<String>,
    pub tag: Option<String>,
    /// Opaque payload carried through to the click handler
    pub data: Option<serde_json::Value>,
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}

/// A button on a notification
#[derive(Debug, Clone)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: Option<String>,
}

/// Seam over the host notification surface
pub trait NotificationDisplay {
    /// Display a notification. Returns once the host has accepted it.
    fn show(&self, notification: &Notification) -> Result<(), PlatformError>;

    /// Close a visible notification by tag. Returns false if none matched.
    fn close(&self, tag: &str) -> bool;
}

/// Display double that records everything shown
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    inner: Arc<Mutex<DisplayInner>>,
}

#[derive(Default)]
struct DisplayInner {
    visible: Vec<Notification>,
    show_calls: u32,
    fail_next: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently visible notifications, after tag coalescing
    pub fn visible(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().visible.clone()
    }

    /// Total `show` calls, including replacements
    pub fn show_calls(&self) -> u32 {
        self.inner.lock().unwrap().show_calls
    }

    /// Make the next `show` call fail
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }
}

impl NotificationDisplay for RecordingDisplay {
    fn show(&self, notification: &Notification) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.show_calls += 1;
        if inner.fail_next {
            inner.fail_next = false;
            return Err(PlatformError::DisplayFailed("display refused".to_string()));
        }
        if let Some(tag) = &notification.options.tag {
            inner
                .visible
                .retain(|shown| shown.options.tag.as_deref() != Some(tag.as_str()));
        }
        inner.visible.push(notification.clone());
        Ok(())
    }

    fn close(&self, tag: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.visible.len();
        inner
            .visible
            .retain(|shown| shown.options.tag.as_deref() != Some(tag));
        inner.visible.len() != before
    }
}
