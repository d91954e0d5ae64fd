//! nimbus-api
//!
//! Everything both execution contexts share with the backend: the wire
//! types that cross process boundaries (push payloads, worker command
//! messages, subscription envelopes), the `BackendApi` trait, a blocking
//! HTTP adapter with CSRF protection, and a recording fake for tests.

pub mod backend;
pub mod csrf;
pub mod wire;

pub use backend::{BackendApi, BackendError, Endpoints, FakeBackend, HttpBackend};
pub use wire::{
    EndpointMessage, NotificationPayload, PayloadAction, PushMessage, SubscriptionChangeMessage,
    WorkerCommand,
};
