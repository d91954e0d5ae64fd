//! nimbus-platform
//!
//! Typed seams over the browser platform: permission state, the push
//! service, fetch/network, cache storage, window clients and OS
//! notifications. The page-side controller and the worker agent only talk
//! to the platform through the traits defined here; each trait ships with
//! an in-memory implementation so both agents can run (and be tested)
//! without a real browser underneath.

pub mod cache;
pub mod clients;
pub mod compat;
pub mod error;
pub mod fetch;
pub mod notifications;
pub mod permission;
pub mod push;
pub mod registration;

pub use cache::{Cache, CacheStorage};
pub use clients::{ClientId, InMemoryClients, PageClient, WindowClients};
pub use compat::Capabilities;
pub use error::PlatformError;
pub use fetch::{Network, NetworkError, Request, RequestMode, Response, ResponseType, ScriptedNetwork};
pub use notifications::{
    Notification, NotificationAction, NotificationDisplay, NotificationOptions, RecordingDisplay,
};
pub use permission::{InMemoryPermission, PermissionPrompt, PermissionState};
pub use push::{
    decode_server_key, InMemoryPushService, KeyDecodeError, PushService, PushSubscription,
    SubscriptionKeys, SERVER_KEY_LEN,
};
pub use registration::{InMemoryWorkerHost, WorkerHost};
