use super::checkout_repository::{CheckoutRepositoryUseCase, StagingLayout};
use crate::domain::entities::checkout::CheckoutRequest;
use crate::domain::entities::tool::ResolvedTool;
use crate::infrastructure::filesystem::local_fs::FileSystemProvider;
use crate::infrastructure::process::ProgressReporter;
use crate::infrastructure::scm::ScmError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Install workflow errors
#[derive(Debug, Error)]
pub enum InstallRepositoryError {
    #[error(transparent)]
    Checkout(#[from] ScmError),

    #[error("Failed to {action} {path}: {source}")]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallRepositoryError {
    fn fs(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Directory now holding the plain file tree
    pub target: PathBuf,

    /// Version of the tool that performed the checkout
    pub tool_version: String,
}

/// Checks a repository out and installs it as a plain file tree at its target.
///
/// The tool's metadata directory is stripped before copying. An existing
/// target is replaced, not merged into. The staging directory is removed
/// afterwards whatever the outcome.
pub struct InstallRepositoryUseCase {
    checkout: Arc<CheckoutRepositoryUseCase>,
    fs: Arc<dyn FileSystemProvider>,
}

impl InstallRepositoryUseCase {
    pub fn new(checkout: Arc<CheckoutRepositoryUseCase>, fs: Arc<dyn FileSystemProvider>) -> Self {
        Self { checkout, fs }
    }

    pub async fn install(
        &self,
        tool: &ResolvedTool,
        request: CheckoutRequest,
        progress: Arc<dyn ProgressReporter>,
        cancellation: Option<CancellationToken>,
    ) -> Result<InstallResult, InstallRepositoryError> {
        let target = request.target.clone();
        let target_existed = self
            .fs
            .stat(&target)
            .await
            .map_err(|e| InstallRepositoryError::fs("inspect", &target, e))?
            .is_some();
        let staging = StagingLayout::for_target(&target, &self.checkout.config().staging_suffix);

        let outcome = self.checkout_and_copy(tool, request, progress, cancellation).await;

        if let Some(staging) = &staging {
            if let Err(e) = self.fs.delete(&staging.root).await {
                warn!("Failed to remove staging directory {}: {}", staging.root.display(), e);
            }
        }

        if outcome.is_err() && !target_existed {
            debug!("Removing partially installed {}", target.display());
            if let Err(e) = self.fs.delete(&target).await {
                warn!("Failed to remove {}: {}", target.display(), e);
            }
        }

        outcome?;
        info!("Installed {} into {}", tool.descriptor.name, target.display());

        Ok(InstallResult {
            target,
            tool_version: tool.version.clone(),
        })
    }

    async fn checkout_and_copy(
        &self,
        tool: &ResolvedTool,
        request: CheckoutRequest,
        progress: Arc<dyn ProgressReporter>,
        cancellation: Option<CancellationToken>,
    ) -> Result<(), InstallRepositoryError> {
        let result = self
            .checkout
            .checkout(tool, request, progress, cancellation)
            .await?;

        let metadata = result.checkout_dir.join(tool.descriptor.metadata_dir());
        self.fs
            .delete(&metadata)
            .await
            .map_err(|e| InstallRepositoryError::fs("remove", &metadata, e))?;

        let target = &result.request.target;
        self.fs
            .delete(target)
            .await
            .map_err(|e| InstallRepositoryError::fs("replace", target, e))?;
        self.fs
            .copy(&result.checkout_dir, target)
            .await
            .map_err(|e| InstallRepositoryError::fs("copy into", target, e))?;

        Ok(())
    }
}
