use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Branch, tag or commit to check out.
///
/// The fields are not mutually exclusive; whichever are set are forwarded to
/// the tool's command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl RefSelector {
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.tag.is_none() && self.commit.is_none()
    }
}

/// A request to materialize a remote repository next to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Remote repository URL
    pub url: String,

    /// Final destination; the engine only stages next to it
    pub target: PathBuf,

    #[serde(default)]
    pub reference: RefSelector,
}

impl CheckoutRequest {
    pub fn new(url: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            target: target.into(),
            reference: RefSelector::default(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.reference.branch = Some(branch.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.reference.tag = Some(tag.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.reference.commit = Some(commit.into());
        self
    }
}

/// Outcome of a successful checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResult {
    /// Directory holding the fresh checkout, never equal to `request.target`
    pub checkout_dir: PathBuf,

    /// The request this result answers
    pub request: CheckoutRequest,
}

impl CheckoutResult {
    /// Staging parent that the caller should remove once done
    pub fn staging_root(&self) -> Option<&Path> {
        self.checkout_dir.parent()
    }
}
