//! PostgreSQL implementations of the store traits.

pub mod notification;
pub mod request;
pub mod user;

pub use notification::NotificationRepository;
pub use request::RequestRepository;
pub use user::UserRepository;

use medireach_core::error::{AppError, ErrorKind};

/// Map a sqlx failure to an [`AppError`], separating unreachable-store
/// failures from failed queries.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let kind = match &e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => ErrorKind::DependencyUnavailable,
            _ => ErrorKind::Database,
        };
        AppError::with_source(kind, context, e)
    }
}
