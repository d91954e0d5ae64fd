//! UI State
//!
//! The one state the subscription button renders from. Transitions happen
//! only inside the controller's operations.

/// Subscription UI state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// The host lacks service workers or push; terminal
    Unsupported,
    /// Permission denied in browser settings; terminal until the user
    /// changes them
    PermissionDenied,
    Unsubscribed,
    /// An operation is in flight; the button is disabled
    Loading,
    Subscribed,
    /// The last operation failed; the button is usable again
    Error,
}

impl UiState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiState::Unsupported => "unsupported",
            UiState::PermissionDenied => "permission-denied",
            UiState::Unsubscribed => "unsubscribed",
            UiState::Loading => "loading",
            UiState::Subscribed => "subscribed",
            UiState::Error => "error",
        }
    }

    /// Whether the subscribe/unsubscribe button should accept clicks
    pub fn interactive(&self) -> bool {
        matches!(self, UiState::Unsubscribed | UiState::Subscribed | UiState::Error)
    }
}
