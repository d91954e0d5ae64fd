//! Notification Permission
//!
//! Tri-state permission owned by the platform. A denied permission is
//! sticky: no prompt can ever re-ask programmatically.

use std::sync::{Arc, Mutex};

/// Notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Never asked
    Default,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }
}

/// Seam for querying and prompting notification permission
pub trait PermissionPrompt {
    /// Current permission without prompting
    fn state(&self) -> PermissionState;

    /// Prompt the user. Must be driven by a user gesture in a real
    /// browser; here the decision comes from the implementation.
    fn request(&self) -> PermissionState;
}

/// In-memory permission with a scripted prompt decision
#[derive(Clone)]
pub struct InMemoryPermission {
    state: Arc<Mutex<PermissionState>>,
    decision: PermissionState,
}

impl InMemoryPermission {
    /// Permission that grants when prompted
    pub fn granting() -> Self {
        Self::with_decision(PermissionState::Granted)
    }

    /// Permission that denies when prompted
    pub fn denying() -> Self {
        Self::with_decision(PermissionState::Denied)
    }

    /// Permission already denied in browser settings
    pub fn already_denied() -> Self {
        Self {
            state: Arc::new(Mutex::new(PermissionState::Denied)),
            decision: PermissionState::Denied,
        }
    }

    fn with_decision(decision: PermissionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(PermissionState::Default)),
            decision,
        }
    }
}

impl PermissionPrompt for InMemoryPermission {
    fn state(&self) -> PermissionState {
        *self.state.lock().unwrap()
    }

    fn request(&self) -> PermissionState {
        let mut state = self.state.lock().unwrap();
        // Denied is terminal; Granted needs no second prompt
        if *state == PermissionState::Default {
            *state = self.decision;
        }
        *state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_grants_once() {
        let permission = InMemoryPermission::granting();
        assert_eq!(permission.state(), PermissionState::Default);
        assert_eq!(permission.request(), PermissionState::Granted);
        assert_eq!(permission.state(), PermissionState::Granted);
    }

    #[test]
    fn test_denied_is_sticky() {
        let permission = InMemoryPermission::already_denied();
        assert_eq!(permission.request(), PermissionState::Denied);
        assert_eq!(permission.request(), PermissionState::Denied);
    }
}
