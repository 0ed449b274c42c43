//! Notification domain entities.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::NotificationKind;
pub use model::{Notification, NotificationDraft};
pub use status::NotificationStatus;
