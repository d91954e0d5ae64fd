//! Toasts
//!
//! Transient in-page messages. Toasts stack independently and disappear
//! after a fixed lifetime or an explicit dismiss.

use std::time::{Duration, Instant};

/// How long a toast stays visible
const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Handle to a displayed toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastId(u64);

/// Toast severity, which drives styling only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One visible toast
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub level: ToastLevel,
    pub message: String,
    shown_at: Instant,
}

impl Toast {
    fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_LIFETIME
    }
}

/// Owns the visible toast stack
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast; it stacks under any already visible
    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) -> ToastId {
        self.next_id += 1;
        let id = ToastId(self.next_id);
        self.toasts.push(Toast {
            id,
            level,
            message: message.into(),
            shown_at: Instant::now(),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Success, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Error, message)
    }

    /// Explicitly dismiss one toast. Returns false if already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast older than the lifetime, as of `now`
    pub fn dismiss_expired(&mut self, now: Instant) {
        self.toasts.retain(|toast| !toast.expired_at(now));
    }

    /// Currently visible toasts, oldest first
    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_stack_independently() {
        let mut toasts = ToastManager::new();
        let first = toasts.success("subscribed");
        let second = toasts.error("save failed");
        assert_eq!(toasts.visible().len(), 2);

        assert!(toasts.dismiss(first));
        assert_eq!(toasts.visible().len(), 1);
        assert_eq!(toasts.visible()[0].id, second);
        assert!(!toasts.dismiss(first));
    }

    #[test]
    fn test_toasts_expire_after_lifetime() {
        let mut toasts = ToastManager::new();
        toasts.info("checking subscription");

        toasts.dismiss_expired(Instant::now());
        assert_eq!(toasts.visible().len(), 1);

        toasts.dismiss_expired(Instant::now() + Duration::from_secs(6));
        assert!(toasts.visible().is_empty());
    }
}
