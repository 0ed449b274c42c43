//! Request lifecycle: guards, caller input and the orchestrating service.

pub mod input;
pub mod lifecycle;
pub mod service;

pub use input::{CreateRequest, EditRequest};
pub use lifecycle::Action;
pub use service::{RequestService, TransitionOutcome};
