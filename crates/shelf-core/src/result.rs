//! Convenience result type alias for Shelf.

use crate::error::AppError;

/// A specialized `Result` type for Shelf operations.
pub type AppResult<T> = Result<T, AppError>;
