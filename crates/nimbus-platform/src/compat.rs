//! Feature Detection
//!
//! What the hosting browser supports. The controller checks this once at
//! startup; an unsupported platform is a terminal condition.

/// Host feature support flags
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub service_worker: bool,
    pub push_manager: bool,
}

impl Capabilities {
    /// A fully capable host
    pub fn full() -> Self {
        Self {
            service_worker: true,
            push_manager: true,
        }
    }

    /// A host with neither API
    pub fn none() -> Self {
        Self {
            service_worker: false,
            push_manager: false,
        }
    }

    /// Push requires both the worker and the push manager
    pub fn push_supported(&self) -> bool {
        self.service_worker && self.push_manager
    }
}
