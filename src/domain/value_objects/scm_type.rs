use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version control tool kind supported by the checkout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScmType {
    /// Git version control system
    Git,
    /// Subversion (SVN) version control system
    Svn,
}

impl fmt::Display for ScmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmType::Git => write!(f, "git"),
            ScmType::Svn => write!(f, "svn"),
        }
    }
}

impl FromStr for ScmType {
    type Err = ScmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(ScmType::Git),
            "svn" | "subversion" => Ok(ScmType::Svn),
            _ => Err(ScmTypeError::UnsupportedScmType(s.to_string())),
        }
    }
}

impl ScmType {
    /// Every supported tool kind, in discovery order
    pub const ALL: [ScmType; 2] = [ScmType::Git, ScmType::Svn];

    /// Get the metadata directory name for this SCM
    pub fn metadata_dir(&self) -> &'static str {
        match self {
            ScmType::Git => ".git",
            ScmType::Svn => ".svn",
        }
    }
}

/// Errors that can occur when working with SCM types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScmTypeError {
    /// The specified SCM type is not supported
    #[error("Unsupported SCM type: '{0}'. Supported types are: git, svn")]
    UnsupportedScmType(String),
}
