//! nimbus-worker
//!
//! The Worker Agent: runs in the service-worker context, owns the
//! versioned cache, intercepts fetches cache-first, displays push
//! notifications, and routes clicks, command messages, background sync and
//! subscription rotations. It has no DOM access; everything it touches
//! goes through a platform seam.

pub mod agent;
pub mod click;
pub mod config;
pub mod fetch;
pub mod push;

pub use agent::{WorkerAgent, WorkerError, WorkerState};
pub use click::{ClickOutcome, NotificationClick};
pub use config::WorkerConfig;
pub use fetch::FetchDecision;
