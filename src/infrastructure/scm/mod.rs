//! Tool discovery, error taxonomy and failure classification for git and svn.

pub mod binary_locator;
pub mod error_classifier;
pub mod scm_error;
pub mod tool_registry;

pub use binary_locator::{BinaryLocator, LocatedBinary, SystemProbe, ToolProbe};
pub use error_classifier::{classify, classify_spawn_error};
pub use scm_error::{ScmError, ScmErrorCode};
pub use tool_registry::ToolRegistry;
