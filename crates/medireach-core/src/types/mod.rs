//! Core type definitions used across the MediReach workspace.

pub mod geo;
pub mod id;

pub use geo::Coordinates;
pub use id::*;
