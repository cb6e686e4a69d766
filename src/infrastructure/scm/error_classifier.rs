//! Maps tool diagnostics to [`ScmErrorCode`]s.
//!
//! Probes are ordered; the first match wins.

use super::scm_error::ScmErrorCode;
use crate::domain::value_objects::scm_type::ScmType;
use regex::Regex;
use std::io;
use std::sync::OnceLock;

struct Probe {
    pattern: Regex,
    code: ScmErrorCode,
}

fn probe(pattern: &str, code: ScmErrorCode) -> Probe {
    Probe {
        pattern: Regex::new(pattern).expect("classifier pattern is valid"),
        code,
    }
}

fn git_probes() -> &'static [Probe] {
    static PROBES: OnceLock<Vec<Probe>> = OnceLock::new();
    PROBES.get_or_init(|| {
        vec![
            probe(
                r"Another git process seems to be running in this repository|If no other git process is currently running",
                ScmErrorCode::RepositoryIsLocked,
            ),
            probe(r"(?i)Authentication failed", ScmErrorCode::AuthenticationFailed),
            probe(r"(?i)Not a git repository", ScmErrorCode::NotARepository),
            probe(r"bad config file", ScmErrorCode::BadConfigFile),
            probe(
                r"cannot make pipe for command substitution|cannot create standard input pipe",
                ScmErrorCode::CantCreatePipe,
            ),
            probe(r"Repository not found", ScmErrorCode::RepositoryNotFound),
            probe(r"unable to access", ScmErrorCode::CantAccessRemote),
            probe(r"branch '.+' is not fully merged", ScmErrorCode::BranchNotFullyMerged),
            probe(r"Couldn't find remote ref", ScmErrorCode::NoRemoteReference),
            probe(r"A branch named '.+' already exists", ScmErrorCode::BranchAlreadyExists),
            probe(r"'.+' is not a valid branch name", ScmErrorCode::InvalidBranchName),
            probe(r"Please,? commit your changes or stash them", ScmErrorCode::DirtyWorkTree),
        ]
    })
}

fn svn_probes() -> &'static [Probe] {
    static PROBES: OnceLock<Vec<Probe>> = OnceLock::new();
    PROBES.get_or_init(|| {
        vec![
            probe(r"svn: E170001", ScmErrorCode::AuthorizationFailed),
            probe(r"svn: E155004", ScmErrorCode::RepositoryIsLocked),
            probe(r"svn: E155007", ScmErrorCode::NotARepository),
            probe(r"svn: E195012", ScmErrorCode::NotShareCommonAncestry),
            probe(r"svn: E155036", ScmErrorCode::WorkingCopyIsTooOld),
            probe(r"svn: E170013", ScmErrorCode::UnableToConnect),
            probe(
                r"No more credentials or we tried too many times",
                ScmErrorCode::AuthorizationFailed,
            ),
        ]
    })
}

/// Classify a tool's diagnostic output
pub fn classify(scm_type: ScmType, stderr: &str) -> Option<ScmErrorCode> {
    let probes = match scm_type {
        ScmType::Git => git_probes(),
        ScmType::Svn => svn_probes(),
    };

    probes
        .iter()
        .find(|probe| probe.pattern.is_match(stderr))
        .map(|probe| probe.code)
}

/// Classify a failure to start the process at all.
///
/// A missing executable is the only spawn failure with its own code; it is
/// decided before any tool-specific probe runs.
pub fn classify_spawn_error(error: &io::Error) -> Option<ScmErrorCode> {
    if error.kind() == io::ErrorKind::NotFound {
        return Some(ScmErrorCode::NotFound);
    }
    // Some platforms only report ENOENT through the raw OS error
    if error.raw_os_error() == Some(2) {
        return Some(ScmErrorCode::NotFound);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_authentication_failed() {
        assert_eq!(
            classify(
                ScmType::Git,
                "fatal: Authentication failed for 'https://github.com/private/repo.git/'"
            ),
            Some(ScmErrorCode::AuthenticationFailed)
        );
        assert_eq!(
            classify(ScmType::Git, "remote: authentication FAILED"),
            Some(ScmErrorCode::AuthenticationFailed)
        );
    }

    #[test]
    fn test_svn_authorization_failed() {
        assert_eq!(
            classify(ScmType::Svn, "svn: E170001: Authorization failed"),
            Some(ScmErrorCode::AuthorizationFailed)
        );
        assert_eq!(
            classify(
                ScmType::Svn,
                "svn: E215004: No more credentials or we tried too many times."
            ),
            Some(ScmErrorCode::AuthorizationFailed)
        );
    }

    #[test]
    fn test_unmatched_text() {
        assert_eq!(classify(ScmType::Git, "warning: something odd"), None);
        assert_eq!(classify(ScmType::Svn, "svn: E000000: whatever"), None);
        assert_eq!(classify(ScmType::Git, ""), None);
    }

    #[test]
    fn test_probes_are_tool_specific() {
        assert_eq!(classify(ScmType::Git, "svn: E170001: Authorization failed"), None);
        assert_eq!(
            classify(ScmType::Svn, "fatal: repository 'x' not found: Repository not found"),
            None
        );
    }

    #[test]
    fn test_git_probe_order() {
        // Lock contention is checked before authentication
        let stderr = "fatal: Unable to create '.git/index.lock': File exists.\n\
                      Another git process seems to be running in this repository.\n\
                      Authentication failed";
        assert_eq!(
            classify(ScmType::Git, stderr),
            Some(ScmErrorCode::RepositoryIsLocked)
        );

        assert_eq!(
            classify(
                ScmType::Git,
                "fatal: unable to access 'https://example.com/': Could not resolve host"
            ),
            Some(ScmErrorCode::CantAccessRemote)
        );
        assert_eq!(
            classify(ScmType::Git, "fatal: Remote branch nope not found\nfatal: Couldn't find remote ref nope"),
            Some(ScmErrorCode::NoRemoteReference)
        );
        assert_eq!(
            classify(ScmType::Git, "fatal: 'bad..name' is not a valid branch name"),
            Some(ScmErrorCode::InvalidBranchName)
        );
        assert_eq!(
            classify(ScmType::Git, "Please commit your changes or stash them before you switch branches."),
            Some(ScmErrorCode::DirtyWorkTree)
        );
        assert_eq!(
            classify(ScmType::Git, "fatal: not a git repository (or any of the parent directories): .git"),
            Some(ScmErrorCode::NotARepository)
        );
    }

    #[test]
    fn test_svn_codes() {
        assert_eq!(
            classify(ScmType::Svn, "svn: E155004: Working copy '/x' locked."),
            Some(ScmErrorCode::RepositoryIsLocked)
        );
        assert_eq!(
            classify(ScmType::Svn, "svn: E155007: '/x' is not a working copy"),
            Some(ScmErrorCode::NotARepository)
        );
        assert_eq!(
            classify(ScmType::Svn, "svn: E170013: Unable to connect to a repository at URL"),
            Some(ScmErrorCode::UnableToConnect)
        );
        assert_eq!(
            classify(ScmType::Svn, "svn: E155036: Please see the 'svn upgrade' command"),
            Some(ScmErrorCode::WorkingCopyIsTooOld)
        );
    }

    #[test]
    fn test_spawn_error_classification() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "program not found");
        assert_eq!(classify_spawn_error(&missing), Some(ScmErrorCode::NotFound));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(classify_spawn_error(&denied), None);
    }
}
