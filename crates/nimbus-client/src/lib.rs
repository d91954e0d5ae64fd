//! nimbus-client
//!
//! The Subscription Controller: runs in the page context and owns the
//! subscribe/unsubscribe lifecycle, the UI state machine, toast
//! notifications and the in-page notification inbox. The browser platform
//! and the backend are injected seams, so the controller itself never
//! touches a real browser or a real network.

pub mod config;
pub mod controller;
pub mod inbox;
pub mod toast;
pub mod ui;

pub use config::ClientConfig;
pub use controller::{ClientError, SubscriptionController};
pub use inbox::{InboxItem, NotificationInbox};
pub use toast::{Toast, ToastId, ToastLevel, ToastManager};
pub use ui::UiState;
