//! # medireach-database
//!
//! The engine's store boundary: traits for request, user and notification
//! storage, PostgreSQL repositories implementing them, and an in-memory
//! store with the same conditional-write semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AcceptWrite, ConditionalWrite, NotificationStore, RequestStore, UserDirectory};
