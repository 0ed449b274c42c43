//! # medireach-service
//!
//! The request lifecycle engine. [`RequestService`] applies transitions
//! against the store with conditional writes, [`DonorMatcher`] ranks donor
//! candidates, and [`NotificationDispatcher`] turns committed events into
//! notification drafts.
//!
//! Services follow constructor injection: every store and the geocoder
//! are handed in as `Arc<dyn Trait>` at construction time.

pub mod context;
pub mod matching;
pub mod notification;
pub mod request;

pub use context::ActorContext;
pub use matching::{DonorMatcher, MatchOutcome, RankedDonor, format_distance};
pub use notification::{DispatchContext, NotificationDispatcher, NotificationService};
pub use request::{Action, CreateRequest, EditRequest, RequestService, TransitionOutcome};
