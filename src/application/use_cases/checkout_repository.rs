use crate::domain::entities::checkout::{CheckoutRequest, CheckoutResult};
use crate::domain::entities::tool::{CheckoutCommand, ResolvedTool};
use crate::infrastructure::filesystem::config_store::{EngineConfig, MAX_CHECKOUT_ATTEMPTS};
use crate::infrastructure::filesystem::local_fs::FileSystemProvider;
use crate::infrastructure::process::{ExecOptions, ProgressParser, ProgressReporter, ScmExecutor};
use crate::infrastructure::scm::{ScmError, ScmErrorCode};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Checkout settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Total attempts including the first, clamped to 1..=4
    pub max_attempts: u32,

    /// Staging directory suffix
    pub staging_suffix: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_CHECKOUT_ATTEMPTS,
            staging_suffix: ".clone".to_string(),
        }
    }
}

impl From<&EngineConfig> for CheckoutConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            staging_suffix: config.staging_suffix.clone(),
        }
    }
}

impl CheckoutConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_staging_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.staging_suffix = suffix.into();
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_CHECKOUT_ATTEMPTS)
    }
}

/// Where a checkout for `target` is staged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    /// `<target parent>/.<target name><suffix>`, recreated for every checkout
    pub root: PathBuf,

    /// `<root>/<target name>`, passed to the tool as its destination
    pub checkout_dir: PathBuf,
}

impl StagingLayout {
    /// Compute the staging paths for a target. Fails when the target has no
    /// final component, e.g. `/` or `..`.
    pub fn for_target(target: &Path, suffix: &str) -> Option<Self> {
        let name = target.file_name()?;
        let parent = target.parent().unwrap_or_else(|| Path::new(""));

        let mut staging_name = std::ffi::OsString::from(".");
        staging_name.push(name);
        staging_name.push(suffix);

        let root = parent.join(staging_name);
        let checkout_dir = root.join(name);
        Some(Self { root, checkout_dir })
    }
}

/// Checks a repository out into a staging directory next to its target,
/// retrying failed attempts.
///
/// Copying into the target and stripping tool metadata are left to the caller.
pub struct CheckoutRepositoryUseCase {
    executor: Arc<dyn ScmExecutor>,
    fs: Arc<dyn FileSystemProvider>,
    config: CheckoutConfig,
}

impl CheckoutRepositoryUseCase {
    pub fn new(
        executor: Arc<dyn ScmExecutor>,
        fs: Arc<dyn FileSystemProvider>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            executor,
            fs,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub async fn checkout(
        &self,
        tool: &ResolvedTool,
        request: CheckoutRequest,
        progress: Arc<dyn ProgressReporter>,
        cancellation: Option<CancellationToken>,
    ) -> Result<CheckoutResult, ScmError> {
        // The tool runs with the staging root as its working directory
        let target = if request.target.is_absolute() {
            request.target.clone()
        } else {
            std::env::current_dir()
                .map_err(|e| {
                    ScmError::new(
                        tool.descriptor,
                        ScmErrorCode::Unclassified,
                        "Failed to resolve the current directory",
                    )
                    .with_source(e)
                })?
                .join(&request.target)
        };

        let layout = StagingLayout::for_target(&target, &self.config.staging_suffix)
            .ok_or_else(|| {
                ScmError::new(
                    tool.descriptor,
                    ScmErrorCode::Unclassified,
                    format!("Invalid checkout target: {}", request.target.display()),
                )
            })?;

        self.prepare_staging(tool, &layout.root).await?;

        let max_attempts = self.config.attempts();
        let mut attempt = 1;

        loop {
            debug!(
                "{} checkout of {} attempt {}/{}",
                tool.descriptor.name, request.url, attempt, max_attempts
            );

            let error = match self
                .run_attempt(tool, &request, &layout, progress.clone(), cancellation.clone())
                .await
            {
                Ok(()) => {
                    return Ok(CheckoutResult {
                        checkout_dir: layout.checkout_dir,
                        request,
                    })
                }
                Err(error) => error,
            };

            if error.is_cancelled() || attempt >= max_attempts {
                return Err(error);
            }

            warn!(
                "{} checkout attempt {}/{} failed ({}), retrying",
                tool.descriptor.name, attempt, max_attempts, error.code
            );
            attempt += 1;
        }
    }

    async fn prepare_staging(&self, tool: &ResolvedTool, root: &Path) -> Result<(), ScmError> {
        let staging_failure = |e: io::Error| {
            ScmError::new(
                tool.descriptor,
                ScmErrorCode::Unclassified,
                format!("Failed to prepare staging directory {}", root.display()),
            )
            .with_source(e)
        };

        self.fs.delete(root).await.map_err(staging_failure)?;
        self.fs.create_directory(root).await.map_err(staging_failure)
    }

    async fn run_attempt(
        &self,
        tool: &ResolvedTool,
        request: &CheckoutRequest,
        layout: &StagingLayout,
        progress: Arc<dyn ProgressReporter>,
        cancellation: Option<CancellationToken>,
    ) -> Result<(), ScmError> {
        // A failed follow-up leaves a clone behind that would block the next one
        self.fs.delete(&layout.checkout_dir).await.map_err(|e| {
            ScmError::new(
                tool.descriptor,
                ScmErrorCode::Unclassified,
                format!("Failed to clear {}", layout.checkout_dir.display()),
            )
            .with_source(e)
        })?;

        let command = CheckoutCommand::new(
            tool.scm_type(),
            &request.url,
            &layout.checkout_dir,
            &request.reference,
        );
        let args = command.to_args().map_err(|e| {
            ScmError::new(tool.descriptor, ScmErrorCode::Unclassified, e.to_string())
                .with_tool_path(&tool.path)
        })?;

        let mut options = ExecOptions::new().with_line_consumer(ProgressParser::new(progress));
        if let Some(token) = cancellation.clone() {
            options = options.with_cancellation_token(token);
        }

        self.executor.exec(tool, &layout.root, &args, options).await?;

        if let Some(follow_up) = command.follow_up_args() {
            let mut options = ExecOptions::new();
            if let Some(token) = cancellation {
                options = options.with_cancellation_token(token);
            }
            self.executor
                .exec(tool, &layout.checkout_dir, &follow_up, options)
                .await?;
        }

        Ok(())
    }
}
