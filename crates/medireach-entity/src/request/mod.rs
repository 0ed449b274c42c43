//! Request domain entities.

pub mod model;
pub mod resource;
pub mod status;
pub mod tracking;
pub mod urgency;

pub use model::{EditRecord, NewRequest, Request, RequestDetails, RequestPatch};
pub use resource::ResourceType;
pub use status::{RequestStatus, VerificationStatus};
pub use tracking::TrackingId;
pub use urgency::Urgency;
