//! # scm-checkout - checkout engine for git and svn
//!
//! `scm-checkout` finds the installed `git` and `svn` executables, validates
//! their versions and runs repository checkouts as external processes. While a
//! checkout runs, the tool's progress output is turned into 0-100 increments;
//! failed attempts are retried and failures are classified into a fixed set of
//! error codes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show which tools are available
//! scm-checkout resolve
//!
//! # Check out a branch into a staging directory next to ./addons/MyAddon
//! scm-checkout checkout git https://github.com/example/addon.git ./addons/MyAddon --branch main
//!
//! # Check out and install the plain file tree (no .git) at the target
//! scm-checkout install svn https://svn.example.com/repo ./addons/Other --tag v1.2
//! ```
//!
//! Settings are read from `scm-checkout.yaml` (or `--config`):
//!
//! ```yaml
//! locale: en_US.UTF-8
//! max_attempts: 4
//! staging_suffix: .clone
//! tools:
//!   git:
//!     path: /usr/local/bin/git
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: tool kinds, descriptors, versions and checkout requests
//! - [`application`]: the checkout and install workflows
//! - [`infrastructure`]: tool discovery, process execution, error classification and file access
//! - [`presentation`]: CLI interface and terminal output
//! - [`common`]: crate-wide error type for the command-line layer
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use scm_checkout::application::use_cases::{CheckoutConfig, CheckoutRepositoryUseCase};
//! use scm_checkout::domain::entities::checkout::CheckoutRequest;
//! use scm_checkout::domain::value_objects::scm_type::ScmType;
//! use scm_checkout::infrastructure::filesystem::config_store::ToolsConfig;
//! use scm_checkout::infrastructure::filesystem::LocalFileSystem;
//! use scm_checkout::infrastructure::process::{NoopProgress, ProcessExecutor};
//! use scm_checkout::infrastructure::scm::{BinaryLocator, ToolRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), scm_checkout::infrastructure::scm::ScmError> {
//! let registry = ToolRegistry::new(BinaryLocator::new(), ToolsConfig::default());
//! let git = registry.resolve(ScmType::Git).await?;
//!
//! let checkout = CheckoutRepositoryUseCase::new(
//!     Arc::new(ProcessExecutor::new()),
//!     Arc::new(LocalFileSystem::new()),
//!     CheckoutConfig::default(),
//! );
//! let request = CheckoutRequest::new("https://github.com/example/addon.git", "/srv/addons/Addon")
//!     .with_tag("v2.0.0");
//! let result = checkout.checkout(&git, request, Arc::new(NoopProgress), None).await?;
//!
//! println!("checked out into {}", result.checkout_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::AppError;
pub use crate::common::result::AppResult as Result;
pub use crate::infrastructure::scm::{ScmError, ScmErrorCode};
