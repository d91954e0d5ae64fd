//! Worker Registration
//!
//! The page-side handle for installing a worker script and waiting for it
//! to become ready.

use std::sync::{Arc, Mutex};

use crate::error::PlatformError;

/// Seam over `navigator.serviceWorker`
pub trait WorkerHost {
    /// Register the worker script
    fn register(&self, script_url: &str) -> Result<(), PlatformError>;

    /// Whether a registration is ready to serve subscriptions
    fn ready(&self) -> bool;
}

/// In-memory worker host
#[derive(Clone, Default)]
pub struct InMemoryWorkerHost {
    inner: Arc<Mutex<HostInner>>,
}

#[derive(Default)]
struct HostInner {
    script_url: Option<String>,
    fail_registration: bool,
}

impl InMemoryWorkerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next registration fail
    pub fn fail_registration(&self) {
        self.inner.lock().unwrap().fail_registration = true;
    }

    /// The registered script URL, if any
    pub fn script_url(&self) -> Option<String> {
        self.inner.lock().unwrap().script_url.clone()
    }
}

impl WorkerHost for InMemoryWorkerHost {
    fn register(&self, script_url: &str) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_registration {
            inner.fail_registration = false;
            return Err(PlatformError::RegistrationFailed(format!(
                "script fetch failed: {script_url}"
            )));
        }
        inner.script_url = Some(script_url.to_string());
        Ok(())
    }

    fn ready(&self) -> bool {
        self.inner.lock().unwrap().script_url.is_some()
    }
}
