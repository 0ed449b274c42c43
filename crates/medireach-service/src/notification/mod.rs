//! Notification fan-out and the recipient inbox.

pub mod dispatcher;
pub mod service;

pub use dispatcher::{DispatchContext, NotificationDispatcher};
pub use service::NotificationService;
