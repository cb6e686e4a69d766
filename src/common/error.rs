use crate::application::use_cases::InstallRepositoryError;
use crate::infrastructure::filesystem::ConfigStoreError;
use crate::infrastructure::scm::{ScmError, ScmErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when the user interrupted the run
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error(transparent)]
    Config(#[from] ConfigStoreError),

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl From<InstallRepositoryError> for AppError {
    fn from(error: InstallRepositoryError) -> Self {
        match error {
            InstallRepositoryError::Checkout(scm) => Self::Scm(scm),
            InstallRepositoryError::FileSystem {
                action,
                path,
                source,
            } => Self::FileSystemError {
                message: format!("failed to {} {}", action, path.display()),
                path: Some(path),
                source: Some(source),
            },
        }
    }
}

impl AppError {
    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Scm(e) if e.code == ScmErrorCode::Cancelled)
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            EXIT_CANCELLED
        } else {
            1
        }
    }

    /// Text shown to the user; tool errors include their full diagnostic
    pub fn render(&self) -> String {
        match self {
            Self::Scm(e) if e.is_cancelled() => e.to_string(),
            Self::Scm(e) => e.render(),
            other => other.to_string(),
        }
    }
}
