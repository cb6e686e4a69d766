use crate::domain::entities::tool::ToolDescriptor;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Classified failure kinds reported by the checkout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScmErrorCode {
    /// Binary could not be discovered or failed its version probe
    NotFound,
    /// Version string unparseable or below the minimum
    InvalidVersion,
    AuthenticationFailed,
    AuthorizationFailed,
    RepositoryIsLocked,
    NotARepository,
    UnableToConnect,
    CantAccessRemote,
    BadConfigFile,
    CantCreatePipe,
    RepositoryNotFound,
    BranchNotFullyMerged,
    NoRemoteReference,
    BranchAlreadyExists,
    InvalidBranchName,
    DirtyWorkTree,
    NotShareCommonAncestry,
    WorkingCopyIsTooOld,
    /// Aborted through a cancellation token
    Cancelled,
    /// Non-zero exit that matched no known pattern
    Unclassified,
}

impl ScmErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScmErrorCode::NotFound => "NotFound",
            ScmErrorCode::InvalidVersion => "InvalidVersion",
            ScmErrorCode::AuthenticationFailed => "AuthenticationFailed",
            ScmErrorCode::AuthorizationFailed => "AuthorizationFailed",
            ScmErrorCode::RepositoryIsLocked => "RepositoryIsLocked",
            ScmErrorCode::NotARepository => "NotARepository",
            ScmErrorCode::UnableToConnect => "UnableToConnect",
            ScmErrorCode::CantAccessRemote => "CantAccessRemote",
            ScmErrorCode::BadConfigFile => "BadConfigFile",
            ScmErrorCode::CantCreatePipe => "CantCreatePipe",
            ScmErrorCode::RepositoryNotFound => "RepositoryNotFound",
            ScmErrorCode::BranchNotFullyMerged => "BranchNotFullyMerged",
            ScmErrorCode::NoRemoteReference => "NoRemoteReference",
            ScmErrorCode::BranchAlreadyExists => "BranchAlreadyExists",
            ScmErrorCode::InvalidBranchName => "InvalidBranchName",
            ScmErrorCode::DirtyWorkTree => "DirtyWorkTree",
            ScmErrorCode::NotShareCommonAncestry => "NotShareCommonAncestry",
            ScmErrorCode::WorkingCopyIsTooOld => "WorkingCopyIsTooOld",
            ScmErrorCode::Cancelled => "Cancelled",
            ScmErrorCode::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for ScmErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by discovery, process execution and checkout.
///
/// Carries everything needed to render a diagnostic: the tool, the classified
/// code, the exit code, both output streams and the command line.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ScmError {
    pub tool: ToolDescriptor,
    pub tool_path: Option<PathBuf>,
    pub message: String,
    #[source]
    pub source: Option<std::io::Error>,
    pub exit_code: Option<i32>,
    pub code: ScmErrorCode,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
}

#[derive(Serialize)]
struct RenderedDetail<'a> {
    #[serde(rename = "exitCode")]
    exit_code: Option<i32>,
    #[serde(rename = "scmErrorCode")]
    code: ScmErrorCode,
    #[serde(rename = "scmCommand")]
    command: Option<&'a str>,
    args: &'a [String],
    stdout: Option<&'a str>,
    stderr: Option<&'a str>,
}

impl ScmError {
    /// Create an error with no process context
    pub fn new(tool: ToolDescriptor, code: ScmErrorCode, message: impl Into<String>) -> Self {
        Self {
            tool,
            tool_path: None,
            message: message.into(),
            source: None,
            exit_code: None,
            code,
            stdout: None,
            stderr: None,
            command: None,
            args: Vec::new(),
        }
    }

    /// Create a not found error
    pub fn not_found(tool: ToolDescriptor) -> Self {
        Self::new(
            tool,
            ScmErrorCode::NotFound,
            format!("{} installation not found.", tool.name),
        )
    }

    /// Create a cancelled error
    pub fn cancelled(tool: ToolDescriptor) -> Self {
        Self::new(tool, ScmErrorCode::Cancelled, "Cancelled")
    }

    pub fn with_source(mut self, source: std::io::Error) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = Some(path.into());
        self
    }

    /// Attach the command line; the first argument is the sub-command
    pub fn with_args(mut self, args: &[String]) -> Self {
        self.command = args.first().cloned();
        self.args = args.to_vec();
        self
    }

    pub fn with_output(mut self, exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.exit_code = Some(exit_code);
        self.stdout = Some(stdout.into());
        self.stderr = Some(stderr.into());
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ScmErrorCode::Cancelled
    }

    /// Full diagnostic: the message followed by a pretty JSON detail block
    pub fn render(&self) -> String {
        let detail = RenderedDetail {
            exit_code: self.exit_code,
            code: self.code,
            command: self.command.as_deref(),
            args: &self.args,
            stdout: self.stdout.as_deref(),
            stderr: self.stderr.as_deref(),
        };

        let mut rendered = match serde_json::to_string_pretty(&detail) {
            Ok(json) => format!("{} {}", self.message, json),
            Err(_) => self.message.clone(),
        };

        if let Some(source) = &self.source {
            rendered.push_str(&format!("\ncaused by: {}", source));
        }

        rendered
    }
}
