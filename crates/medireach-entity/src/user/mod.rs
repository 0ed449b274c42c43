//! User domain entities.

pub mod model;
pub mod role;

pub use model::{Donor, User};
pub use role::UserRole;
