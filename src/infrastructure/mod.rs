/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Tool discovery and failure classification (git, svn)
/// - Process execution (spawning, stream draining, progress parsing)
/// - File system operations (staging directories, configuration files)
pub mod filesystem;
pub mod process;
pub mod scm;

// Re-export commonly used types
pub use filesystem::{ConfigStore, EngineConfig, FileSystemProvider, LocalFileSystem};
pub use process::{ExecOptions, ProcessExecutor, ProgressReporter, ScmExecutor};
pub use scm::{BinaryLocator, ScmError, ScmErrorCode, ToolRegistry};
