//! Platform Errors
//!
//! Failures surfaced by the platform seams.

use crate::push::KeyDecodeError;

/// Errors raised by platform seam implementations
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Application server key was not a raw uncompressed P-256 point
    #[error("application server key must be {expected} bytes, got {actual}")]
    ServerKeyLength { expected: usize, actual: usize },

    /// Application server key failed the base64url transform
    #[error("application server key decode failed: {0}")]
    ServerKeyDecode(#[from] KeyDecodeError),

    /// The push service refused to create a subscription
    #[error("push service rejected the subscription request: {0}")]
    SubscribeRejected(String),

    /// Service worker registration failed
    #[error("service worker registration failed: {0}")]
    RegistrationFailed(String),

    /// No window could be opened
    #[error("could not open a window for {0}")]
    OpenWindowDenied(String),

    /// The host refused to display a notification
    #[error("notification display failed: {0}")]
    DisplayFailed(String),
}
