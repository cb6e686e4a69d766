use crate::domain::entities::checkout::RefSelector;
use crate::domain::value_objects::scm_type::ScmType;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Static description of how to find, validate and invoke one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Tool kind
    pub scm_type: ScmType,
    /// Human readable name
    pub name: &'static str,
    /// Executable name without extension
    pub binary: &'static str,
    /// Arguments that print the version and exit 0
    pub version_args: &'static [&'static str],
    /// Lowest accepted version (semver)
    pub min_version: &'static str,
    /// Vendor folder below Program Files on Windows
    pub vendor_folder: &'static str,
}

const GIT: ToolDescriptor = ToolDescriptor {
    scm_type: ScmType::Git,
    name: "Git",
    binary: "git",
    version_args: &["version"],
    min_version: "0.0.0",
    vendor_folder: "Git",
};

const SVN: ToolDescriptor = ToolDescriptor {
    scm_type: ScmType::Svn,
    name: "Svn",
    binary: "svn",
    version_args: &["--version", "--quiet"],
    min_version: "1.6.0",
    vendor_folder: "TortoiseSVN",
};

impl ToolDescriptor {
    /// Descriptor for a tool kind
    pub fn for_scm(scm_type: ScmType) -> &'static ToolDescriptor {
        match scm_type {
            ScmType::Git => &GIT,
            ScmType::Svn => &SVN,
        }
    }

    /// Binary file name on Windows
    pub fn windows_binary(&self) -> String {
        format!("{}.exe", self.binary)
    }

    /// `<base>\<vendor>\bin\<binary>.exe`
    pub fn windows_install_path(&self, base: &Path) -> PathBuf {
        base.join(self.vendor_folder)
            .join("bin")
            .join(self.windows_binary())
    }

    /// Directory the tool keeps its bookkeeping in
    pub fn metadata_dir(&self) -> &'static str {
        self.scm_type.metadata_dir()
    }
}

/// A discovered tool whose version passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub descriptor: ToolDescriptor,
    pub path: PathBuf,
    pub version: String,
    pub found: bool,
}

impl ResolvedTool {
    pub fn new(descriptor: ToolDescriptor, path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            descriptor,
            path: path.into(),
            version: version.into(),
            found: true,
        }
    }

    pub fn scm_type(&self) -> ScmType {
        self.descriptor.scm_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutCommandError {
    #[error("Invalid destination path: {0}")]
    NonUtf8Destination(PathBuf),
}

/// Checkout invocation for one tool kind.
///
/// The URL and destination are explicit fields, so nothing has to be spliced
/// into a textual template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCommand {
    GitClone {
        url: String,
        destination: PathBuf,
        reference: Option<GitReference>,
    },
    SvnCheckout {
        url: String,
        destination: PathBuf,
        revision: Option<String>,
    },
}

/// What `git clone` should check out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    /// Branch or tag name, passed with `--branch`
    Named(String),
    /// Commit id, checked out after a `--no-checkout` clone
    Commit(String),
}

impl CheckoutCommand {
    /// Build the command for a tool kind from a request's URL and ref selector.
    ///
    /// Both tools take a tag over a branch. Git takes a commit over either,
    /// cloning without a checkout and then switching to it. Subversion
    /// addresses tags and branches through the standard `tags/` and
    /// `branches/` layout and pins commits with `--revision`.
    pub fn new(scm_type: ScmType, url: &str, destination: &Path, selector: &RefSelector) -> Self {
        match scm_type {
            ScmType::Git => {
                let reference = selector
                    .commit
                    .clone()
                    .map(GitReference::Commit)
                    .or_else(|| selector.tag.clone().map(GitReference::Named))
                    .or_else(|| selector.branch.clone().map(GitReference::Named));

                CheckoutCommand::GitClone {
                    url: url.to_string(),
                    destination: destination.to_path_buf(),
                    reference,
                }
            }
            ScmType::Svn => {
                let url = if let Some(tag) = &selector.tag {
                    svn_layout_url(url, "tags", tag)
                } else if let Some(branch) = &selector.branch {
                    svn_layout_url(url, "branches", branch)
                } else {
                    url.to_string()
                };

                CheckoutCommand::SvnCheckout {
                    url,
                    destination: destination.to_path_buf(),
                    revision: selector.commit.clone(),
                }
            }
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            CheckoutCommand::GitClone { destination, .. } => destination,
            CheckoutCommand::SvnCheckout { destination, .. } => destination,
        }
    }

    /// Render the argument list passed to the tool binary
    pub fn to_args(&self) -> Result<Vec<String>, CheckoutCommandError> {
        let destination = self
            .destination()
            .to_str()
            .ok_or_else(|| CheckoutCommandError::NonUtf8Destination(self.destination().to_path_buf()))?
            .to_string();

        let args = match self {
            CheckoutCommand::GitClone { url, reference, .. } => {
                // --progress keeps the phase counters coming when stderr is a pipe
                let mut args = vec!["clone".to_string(), "--progress".to_string()];
                match reference {
                    Some(GitReference::Named(name)) => {
                        args.push("--branch".to_string());
                        args.push(name.clone());
                    }
                    Some(GitReference::Commit(_)) => args.push("--no-checkout".to_string()),
                    None => {}
                }
                args.push(url.clone());
                args.push(destination);
                args
            }
            CheckoutCommand::SvnCheckout { url, revision, .. } => {
                let mut args = vec!["checkout".to_string(), url.clone(), destination];
                if let Some(revision) = revision {
                    args.push("--revision".to_string());
                    args.push(revision.clone());
                }
                args.push("--non-interactive".to_string());
                args
            }
        };

        Ok(args)
    }

    /// Arguments of a second invocation, run inside the destination once the
    /// first one succeeded
    pub fn follow_up_args(&self) -> Option<Vec<String>> {
        match self {
            CheckoutCommand::GitClone {
                reference: Some(GitReference::Commit(commit)),
                ..
            } => Some(vec![
                "checkout".to_string(),
                "--quiet".to_string(),
                commit.clone(),
            ]),
            _ => None,
        }
    }
}

fn svn_layout_url(base: &str, area: &str, name: &str) -> String {
    if let Ok(mut url) = Url::parse(base) {
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(area).push(name);
        } else {
            return format!("{}/{}/{}", base.trim_end_matches('/'), area, name);
        }
        return url.to_string();
    }
    format!("{}/{}/{}", base.trim_end_matches('/'), area, name)
}
