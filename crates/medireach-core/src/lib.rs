//! # medireach-core
//!
//! Core crate for MediReach. Contains the geocoder trait, configuration
//! schemas, typed identifiers, coordinates, request lifecycle events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other MediReach crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
