//! Convenience result type alias for MediReach.

use crate::error::AppError;

/// A specialized `Result` type for MediReach operations.
pub type AppResult<T> = Result<T, AppError>;
