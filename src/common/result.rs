use crate::common::error::AppError;
use std::path::PathBuf;

/// Result alias used across the command-line layer
pub type AppResult<T> = Result<T, AppError>;

/// Attach context to I/O results
pub trait IoResultExt<T> {
    fn with_filesystem_error(self, message: impl Into<String>, path: Option<PathBuf>) -> AppResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_filesystem_error(self, message: impl Into<String>, path: Option<PathBuf>) -> AppResult<T> {
        self.map_err(|e| AppError::filesystem_error_with_source(message, path, e))
    }
}
