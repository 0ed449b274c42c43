//! # medireach-entity
//!
//! Domain entity models for MediReach. Requests, users and notifications
//! are plain data; the lifecycle rules that move a request between
//! statuses live in `medireach-service`. Enumerations are closed: any
//! string outside the known set is rejected at parse time.

pub mod notification;
pub mod request;
pub mod user;
